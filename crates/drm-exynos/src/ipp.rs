//! IPP post-processing: rotator, FIMC memory-to-memory and writeback.
//!
//! One property ioctl describes the source and destination planes, the
//! buf ioctl maps/queues buffers into slots, and the ctrl ioctl starts
//! or stops the operation. Frame completion arrives as a vendor event
//! carrying the finished slot index.

use drm_core::error::{ioctl_err, Result};
use drm_core::Device;

use crate::sys::{self, IppBufCtrl, IppCmd, IppDegree, IppFlip};

/// Describe one direction of the operation.
pub fn config(
    ops_id: usize,
    flip: IppFlip,
    degree: IppDegree,
    fmt: u32,
    width: u32,
    height: u32,
) -> sys::IppConfig {
    let mut cfg = sys::IppConfig::zeroed();
    cfg.ops_id = ops_id as u32;
    cfg.flip = flip as u32;
    cfg.degree = degree as u32;
    cfg.fmt = fmt;
    cfg.sz = sys::ExynosSz {
        hsize: width,
        vsize: height,
    };
    cfg.pos = sys::ExynosPos {
        x: 0,
        y: 0,
        w: width,
        h: height,
    };
    cfg
}

/// A 90 or 270 degree rotation swaps the output dimensions.
pub fn rotated_size(width: u32, height: u32, degree: IppDegree) -> (u32, u32) {
    match degree {
        IppDegree::D90 | IppDegree::D270 => (height, width),
        _ => (width, height),
    }
}

/// Install the source/destination property pair.
pub fn set_property(dev: &Device, src: sys::IppConfig, dst: sys::IppConfig) -> Result<()> {
    let mut arg = sys::IppProperty::zeroed();
    arg.config[sys::EXYNOS_DRM_OPS_SRC] = src;
    arg.config[sys::EXYNOS_DRM_OPS_DST] = dst;
    unsafe { sys::exynos_ioctl_ipp_property(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_IPP_PROPERTY", e))?;
    Ok(())
}

/// Map, unmap, queue or dequeue a buffer in slot `id`. `handles` holds
/// up to one GEM handle per plane (Y/Cb/Cr); unused planes stay 0.
pub fn queue_buf(
    dev: &Device,
    ops_id: usize,
    ctrl: IppBufCtrl,
    id: u32,
    handles: [u32; sys::EXYNOS_DRM_PLANAR_MAX],
) -> Result<()> {
    let mut arg = sys::IppBuf::zeroed();
    arg.ops_id = ops_id as u32;
    arg.buf_ctrl = ctrl as u32;
    arg.id = id;
    arg.handle = handles;
    unsafe { sys::exynos_ioctl_ipp_buf(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_IPP_BUF", e))?;
    Ok(())
}

/// Start or stop the configured operation.
pub fn ctrl(dev: &Device, cmd: IppCmd, start: bool) -> Result<()> {
    let mut arg = sys::IppCtrl::zeroed();
    arg.cmd = cmd as u32;
    arg.use_ = start as u32;
    unsafe { sys::exynos_ioctl_ipp_ctrl(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_IPP_CTRL", e))?;
    Ok(())
}

/// Decode a frame-done record delivered on the event stream.
pub fn parse_event(record: &[u8]) -> Option<sys::IppEvent> {
    if record.len() < std::mem::size_of::<sys::IppEvent>() {
        return None;
    }
    let ev: sys::IppEvent =
        unsafe { std::ptr::read_unaligned(record.as_ptr() as *const sys::IppEvent) };
    Some(ev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_size_swaps_for_quarter_turns() {
        assert_eq!(rotated_size(720, 1280, IppDegree::D90), (1280, 720));
        assert_eq!(rotated_size(720, 1280, IppDegree::D270), (1280, 720));
        assert_eq!(rotated_size(720, 1280, IppDegree::D0), (720, 1280));
        assert_eq!(rotated_size(720, 1280, IppDegree::D180), (720, 1280));
    }

    #[test]
    fn test_config_fills_full_frame() {
        let cfg = config(
            sys::EXYNOS_DRM_OPS_SRC,
            IppFlip::None,
            IppDegree::D0,
            drm_core::sys::DRM_FORMAT_XRGB8888,
            720,
            1280,
        );
        assert_eq!(cfg.ops_id, sys::EXYNOS_DRM_OPS_SRC as u32);
        assert_eq!(cfg.sz.hsize, 720);
        assert_eq!(cfg.pos.w, 720);
        assert_eq!(cfg.pos.h, 1280);
        assert_eq!(cfg.pos.x, 0);
    }

    #[test]
    fn test_parse_event_extracts_slot() {
        let ev = sys::IppEvent {
            base: drm_core::sys::DrmEvent {
                type_: sys::DRM_EXYNOS_IPP_EVENT,
                length: std::mem::size_of::<sys::IppEvent>() as u32,
            },
            user_data: 0,
            tv_sec: 0,
            tv_usec: 0,
            buf_idx: 2,
            reserved: 0,
        };
        let mut buf = vec![0u8; std::mem::size_of::<sys::IppEvent>()];
        unsafe {
            std::ptr::copy_nonoverlapping(
                &ev as *const _ as *const u8,
                buf.as_mut_ptr(),
                buf.len(),
            );
        }
        assert_eq!(parse_event(&buf).unwrap().buf_idx, 2);
        assert!(parse_event(&buf[..8]).is_none());
    }
}
