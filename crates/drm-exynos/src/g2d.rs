//! G2D 2D accelerator: register-write command lists.
//!
//! The driver takes a bounded list of register writes per submission.
//! Writes whose value is a GEM handle go in a separate list so the
//! kernel can patch the handle to a device address. `Cmdlist` builds
//! both, the fill/copy helpers emit the register sequences, and `exec`
//! kicks the hardware.

use drm_core::error::{ioctl_err, DrmError, Result};
use drm_core::Device;

use crate::sys;

/// Register offsets in the FIMG-2D block.
pub mod reg {
    pub const BITBLT_START: u32 = 0x0100;
    pub const BITBLT_COMMAND: u32 = 0x0104;

    pub const SRC_SELECT: u32 = 0x0200;
    pub const SRC_BASE_ADDR: u32 = 0x0204;
    pub const SRC_STRIDE: u32 = 0x0208;
    pub const SRC_COLOR_MODE: u32 = 0x020C;
    pub const SRC_LEFT_TOP: u32 = 0x0210;
    pub const SRC_RIGHT_BOTTOM: u32 = 0x0214;

    pub const DST_SELECT: u32 = 0x0400;
    pub const DST_BASE_ADDR: u32 = 0x0404;
    pub const DST_STRIDE: u32 = 0x0408;
    pub const DST_COLOR_MODE: u32 = 0x040C;
    pub const DST_LEFT_TOP: u32 = 0x0410;
    pub const DST_RIGHT_BOTTOM: u32 = 0x0414;
    pub const DST_A8_RGB_EXT: u32 = 0x0418;

    pub const SF_COLOR: u32 = 0x0700;
}

/// BITBLT_COMMAND bits.
pub const G2D_FAST_SOLID_COLOR_FILL: u32 = 1 << 28;

/// SRC/DST_SELECT values.
pub const G2D_SELECT_MODE_NORMAL: u32 = 0;
pub const G2D_SELECT_MODE_FGCOLOR: u32 = 1;
pub const G2D_SELECT_MODE_BGCOLOR: u32 = 2;

/// Color formats for SRC/DST_COLOR_MODE.
pub const G2D_COLOR_FMT_XRGB8888: u32 = 0;
pub const G2D_COLOR_FMT_ARGB8888: u32 = 1;
pub const G2D_COLOR_FMT_RGB565: u32 = 2;
pub const G2D_COLOR_FMT_XRGB1555: u32 = 3;
pub const G2D_COLOR_FMT_ARGB1555: u32 = 4;
pub const G2D_COLOR_FMT_XRGB4444: u32 = 5;
pub const G2D_COLOR_FMT_ARGB4444: u32 = 6;
pub const G2D_COLOR_FMT_PACKED_RGB888: u32 = 7;

/// Channel orders, shifted into bits 4..6 of the color mode.
pub const G2D_ORDER_AXRGB: u32 = 0 << 4;
pub const G2D_ORDER_RGBAX: u32 = 1 << 4;
pub const G2D_ORDER_AXBGR: u32 = 2 << 4;
pub const G2D_ORDER_BGRAX: u32 = 3 << 4;

/// Hardware limits per submitted command list.
pub const G2D_MAX_CMD_NR: usize = 64;
pub const G2D_MAX_GEM_CMD_NR: usize = 64;

/// Driver version this interface was written against.
pub const G2D_VER_MAJOR: u32 = 4;
pub const G2D_VER_MINOR: u32 = 1;

/// One command list under construction.
#[derive(Debug, Default)]
pub struct Cmdlist {
    cmd: Vec<sys::G2dCmd>,
    cmd_gem: Vec<sys::G2dCmd>,
}

impl Cmdlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain register write.
    pub fn set(&mut self, offset: u32, data: u32) -> Result<()> {
        if self.cmd.len() >= G2D_MAX_CMD_NR {
            return Err(DrmError::InvalidArgument("g2d cmdlist full"));
        }
        self.cmd.push(sys::G2dCmd { offset, data });
        Ok(())
    }

    /// Register write whose data is a GEM handle; the kernel substitutes
    /// the buffer's device address at submission.
    pub fn set_gem(&mut self, offset: u32, handle: u32) -> Result<()> {
        if self.cmd_gem.len() >= G2D_MAX_GEM_CMD_NR {
            return Err(DrmError::InvalidArgument("g2d gem cmdlist full"));
        }
        self.cmd_gem.push(sys::G2dCmd {
            offset,
            data: handle,
        });
        Ok(())
    }

    pub fn cmds(&self) -> &[sys::G2dCmd] {
        &self.cmd
    }

    pub fn gem_cmds(&self) -> &[sys::G2dCmd] {
        &self.cmd_gem
    }

    /// Fill a w x h ARGB8888 buffer object with a solid color.
    pub fn solid_fill(&mut self, handle: u32, w: u32, h: u32, color: u32) -> Result<()> {
        self.set(reg::BITBLT_COMMAND, G2D_FAST_SOLID_COLOR_FILL)?;
        self.set(reg::SF_COLOR, color)?;
        self.set(reg::DST_SELECT, G2D_SELECT_MODE_FGCOLOR)?;
        self.set_gem(reg::DST_BASE_ADDR, handle)?;
        self.set(reg::DST_STRIDE, w * 4)?;
        self.set(
            reg::DST_COLOR_MODE,
            G2D_COLOR_FMT_ARGB8888 | G2D_ORDER_AXRGB,
        )?;
        self.set(reg::DST_LEFT_TOP, 0)?;
        self.set(reg::DST_RIGHT_BOTTOM, (h << 16) | w)?;
        self.set(reg::DST_A8_RGB_EXT, 0)?;
        Ok(())
    }

    /// Copy a w x h ARGB8888 region between two buffer objects.
    pub fn copy(&mut self, src: u32, dst: u32, w: u32, h: u32, stride: u32) -> Result<()> {
        let mode = G2D_COLOR_FMT_ARGB8888 | G2D_ORDER_AXRGB;
        let rb = (h << 16) | w;

        self.set(reg::BITBLT_COMMAND, 0)?;
        self.set(reg::SRC_SELECT, G2D_SELECT_MODE_NORMAL)?;
        self.set_gem(reg::SRC_BASE_ADDR, src)?;
        self.set(reg::SRC_STRIDE, stride)?;
        self.set(reg::SRC_COLOR_MODE, mode)?;
        self.set(reg::SRC_LEFT_TOP, 0)?;
        self.set(reg::SRC_RIGHT_BOTTOM, rb)?;
        self.set(reg::DST_SELECT, G2D_SELECT_MODE_NORMAL)?;
        self.set_gem(reg::DST_BASE_ADDR, dst)?;
        self.set(reg::DST_STRIDE, stride)?;
        self.set(reg::DST_COLOR_MODE, mode)?;
        self.set(reg::DST_LEFT_TOP, 0)?;
        self.set(reg::DST_RIGHT_BOTTOM, rb)?;
        Ok(())
    }

    /// Submit the list. `user_data` is echoed in the completion event
    /// when `event_type` requests one.
    pub fn submit(&self, dev: &Device, event_type: u64, user_data: u64) -> Result<()> {
        if self.cmd.is_empty() && self.cmd_gem.is_empty() {
            return Err(DrmError::InvalidArgument("empty g2d cmdlist"));
        }
        let mut arg = sys::G2dSetCmdlist::zeroed();
        arg.cmd = self.cmd.as_ptr() as u64;
        arg.cmd_gem = self.cmd_gem.as_ptr() as u64;
        arg.cmd_nr = self.cmd.len() as u32;
        arg.cmd_gem_nr = self.cmd_gem.len() as u32;
        arg.event_type = event_type;
        arg.user_data = user_data;
        unsafe { sys::exynos_ioctl_g2d_set_cmdlist(dev.fd(), &mut arg) }
            .map_err(|e| ioctl_err("DRM_EXYNOS_G2D_SET_CMDLIST", e))?;
        Ok(())
    }
}

/// Query the driver interface version and require the one this module
/// emits register sequences for.
pub fn check_version(dev: &Device) -> Result<(u32, u32)> {
    let mut ver = sys::G2dGetVer::zeroed();
    unsafe { sys::exynos_ioctl_g2d_get_ver(dev.fd(), &mut ver) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_G2D_GET_VER", e))?;
    if ver.major != G2D_VER_MAJOR || ver.minor != G2D_VER_MINOR {
        return Err(DrmError::InvalidArgument("unsupported g2d version"));
    }
    Ok((ver.major, ver.minor))
}

/// Start executing all submitted command lists.
pub fn exec(dev: &Device, async_: bool) -> Result<()> {
    let mut arg = sys::G2dExec::zeroed();
    arg.async_ = async_ as u64;
    unsafe { sys::exynos_ioctl_g2d_exec(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_G2D_EXEC", e))?;
    Ok(())
}

/// Decode a G2D completion record delivered on the event stream.
pub fn parse_event(record: &[u8]) -> Option<sys::G2dEvent> {
    if record.len() < std::mem::size_of::<sys::G2dEvent>() {
        return None;
    }
    let ev: sys::G2dEvent =
        unsafe { std::ptr::read_unaligned(record.as_ptr() as *const sys::G2dEvent) };
    Some(ev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_fill_register_sequence() {
        let mut list = Cmdlist::new();
        list.solid_fill(3, 720, 1280, 0xff00ff00).unwrap();

        let cmds = list.cmds();
        assert_eq!(cmds[0].offset, reg::BITBLT_COMMAND);
        assert_eq!(cmds[0].data, G2D_FAST_SOLID_COLOR_FILL);
        assert_eq!(cmds[1].offset, reg::SF_COLOR);
        assert_eq!(cmds[1].data, 0xff00ff00);

        // Destination handle is the only GEM-patched write.
        assert_eq!(list.gem_cmds().len(), 1);
        assert_eq!(list.gem_cmds()[0].offset, reg::DST_BASE_ADDR);
        assert_eq!(list.gem_cmds()[0].data, 3);

        let rb = cmds.iter().find(|c| c.offset == reg::DST_RIGHT_BOTTOM).unwrap();
        assert_eq!(rb.data, (1280 << 16) | 720);
    }

    #[test]
    fn test_copy_uses_two_gem_writes() {
        let mut list = Cmdlist::new();
        list.copy(1, 2, 64, 64, 64 * 4).unwrap();
        assert_eq!(list.gem_cmds().len(), 2);
        assert_eq!(list.gem_cmds()[0].offset, reg::SRC_BASE_ADDR);
        assert_eq!(list.gem_cmds()[1].offset, reg::DST_BASE_ADDR);
    }

    #[test]
    fn test_cmdlist_bounds() {
        let mut list = Cmdlist::new();
        for i in 0..G2D_MAX_CMD_NR {
            list.set(reg::SF_COLOR, i as u32).unwrap();
        }
        assert!(list.set(reg::SF_COLOR, 0).is_err());
    }

    #[test]
    fn test_parse_event_rejects_short_record() {
        assert!(parse_event(&[0u8; 8]).is_none());
    }

    #[test]
    fn test_parse_event_round_trip() {
        let ev = sys::G2dEvent {
            base: drm_core::sys::DrmEvent {
                type_: sys::DRM_EXYNOS_G2D_EVENT,
                length: std::mem::size_of::<sys::G2dEvent>() as u32,
            },
            user_data: 1234,
            tv_sec: 9,
            tv_usec: 10,
            cmdlist_no: 1,
            reserved: 0,
        };
        let mut buf = vec![0u8; std::mem::size_of::<sys::G2dEvent>()];
        unsafe {
            std::ptr::copy_nonoverlapping(
                &ev as *const _ as *const u8,
                buf.as_mut_ptr(),
                buf.len(),
            );
        }
        let parsed = parse_event(&buf).unwrap();
        assert_eq!(parsed.user_data, 1234);
        assert_eq!(parsed.cmdlist_no, 1);
    }
}
