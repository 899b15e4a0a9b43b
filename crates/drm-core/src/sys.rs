//! Raw bindings to the device-independent DRM ioctl ABI.
//!
//! Mirrors the kernel's `drm.h`/`drm_mode.h` records field for field.
//! Array-carrying requests use the kernel's pointer+count protocol: the
//! caller issues the ioctl once with zero counts to learn the sizes, then
//! again with userspace buffers filled in (`mode::fetch` helpers do this).

use std::os::raw::{c_char, c_int};

// ── ioctl numbering ──

pub const DRM_IOCTL_BASE: u8 = b'd';
/// First vendor-private command number. Vendor crates add their own
/// offsets on top of this.
pub const DRM_COMMAND_BASE: u8 = 0x40;

pub const DRM_NR_VERSION: u8 = 0x00;
pub const DRM_NR_GEM_CLOSE: u8 = 0x09;
pub const DRM_NR_GEM_FLINK: u8 = 0x0a;
pub const DRM_NR_GEM_OPEN: u8 = 0x0b;
pub const DRM_NR_PRIME_HANDLE_TO_FD: u8 = 0x2d;
pub const DRM_NR_PRIME_FD_TO_HANDLE: u8 = 0x2e;
pub const DRM_NR_MODE_GETRESOURCES: u8 = 0xa0;
pub const DRM_NR_MODE_GETCRTC: u8 = 0xa1;
pub const DRM_NR_MODE_SETCRTC: u8 = 0xa2;
pub const DRM_NR_MODE_GETENCODER: u8 = 0xa6;
pub const DRM_NR_MODE_GETCONNECTOR: u8 = 0xa7;
pub const DRM_NR_MODE_GETFB: u8 = 0xad;
pub const DRM_NR_MODE_ADDFB: u8 = 0xae;
pub const DRM_NR_MODE_RMFB: u8 = 0xaf;
pub const DRM_NR_MODE_PAGE_FLIP: u8 = 0xb0;
pub const DRM_NR_MODE_CREATE_DUMB: u8 = 0xb2;
pub const DRM_NR_MODE_MAP_DUMB: u8 = 0xb3;
pub const DRM_NR_MODE_DESTROY_DUMB: u8 = 0xb4;
pub const DRM_NR_MODE_GETPLANERESOURCES: u8 = 0xb5;
pub const DRM_NR_MODE_GETPLANE: u8 = 0xb6;
pub const DRM_NR_MODE_SETPLANE: u8 = 0xb7;
pub const DRM_NR_MODE_ADDFB2: u8 = 0xb8;

/// All-fields-zero constructor. Valid for these records: they are plain
/// integer/pointer bags and the kernel treats zero as "unset".
#[macro_export]
macro_rules! impl_zeroed {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $t {
                pub fn zeroed() -> Self {
                    unsafe { std::mem::zeroed() }
                }
            }
            impl Default for $t {
                fn default() -> Self {
                    Self::zeroed()
                }
            }
        )+
    };
}

// ── Version ──

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmVersion {
    pub version_major: c_int,
    pub version_minor: c_int,
    pub version_patchlevel: c_int,
    pub name_len: usize,
    pub name: *mut c_char,
    pub date_len: usize,
    pub date: *mut c_char,
    pub desc_len: usize,
    pub desc: *mut c_char,
}

// ── GEM names and PRIME ──

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmGemClose {
    pub handle: u32,
    pub pad: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmGemFlink {
    pub handle: u32,
    /// Global name, returned by the kernel.
    pub name: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmGemOpen {
    pub name: u32,
    pub handle: u32,
    pub size: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmPrimeHandle {
    pub handle: u32,
    pub flags: u32,
    pub fd: i32,
}

pub const DRM_CLOEXEC: u32 = libc::O_CLOEXEC as u32;

// ── Mode setting ──

pub const DRM_DISPLAY_MODE_LEN: usize = 32;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeInfo {
    pub clock: u32,
    pub hdisplay: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub htotal: u16,
    pub hskew: u16,
    pub vdisplay: u16,
    pub vsync_start: u16,
    pub vsync_end: u16,
    pub vtotal: u16,
    pub vscan: u16,
    pub vrefresh: u32,
    pub flags: u32,
    pub type_: u32,
    pub name: [u8; DRM_DISPLAY_MODE_LEN],
}

impl DrmModeInfo {
    /// Mode name as UTF-8, up to the first NUL.
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeCardRes {
    pub fb_id_ptr: u64,
    pub crtc_id_ptr: u64,
    pub connector_id_ptr: u64,
    pub encoder_id_ptr: u64,
    pub count_fbs: u32,
    pub count_crtcs: u32,
    pub count_connectors: u32,
    pub count_encoders: u32,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeCrtc {
    pub set_connectors_ptr: u64,
    pub count_connectors: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub x: u32,
    pub y: u32,
    pub gamma_size: u32,
    pub mode_valid: u32,
    pub mode: DrmModeInfo,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeGetEncoder {
    pub encoder_id: u32,
    pub encoder_type: u32,
    pub crtc_id: u32,
    pub possible_crtcs: u32,
    pub possible_clones: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeGetConnector {
    pub encoders_ptr: u64,
    pub modes_ptr: u64,
    pub props_ptr: u64,
    pub prop_values_ptr: u64,
    pub count_modes: u32,
    pub count_props: u32,
    pub count_encoders: u32,
    /// Currently attached encoder.
    pub encoder_id: u32,
    pub connector_id: u32,
    pub connector_type: u32,
    pub connector_type_id: u32,
    pub connection: u32,
    pub mm_width: u32,
    pub mm_height: u32,
    pub subpixel: u32,
    pub pad: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeFbCmd {
    pub fb_id: u32,
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bpp: u32,
    pub depth: u32,
    pub handle: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeFbCmd2 {
    pub fb_id: u32,
    pub width: u32,
    pub height: u32,
    pub pixel_format: u32,
    pub flags: u32,
    pub handles: [u32; 4],
    pub pitches: [u32; 4],
    pub offsets: [u32; 4],
}

pub const DRM_MODE_PAGE_FLIP_EVENT: u32 = 0x01;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeCrtcPageFlip {
    pub crtc_id: u32,
    pub fb_id: u32,
    pub flags: u32,
    pub reserved: u32,
    /// Echoed back in the flip-complete event.
    pub user_data: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeCreateDumb {
    pub height: u32,
    pub width: u32,
    pub bpp: u32,
    pub flags: u32,
    pub handle: u32,
    pub pitch: u32,
    pub size: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeMapDumb {
    pub handle: u32,
    pub pad: u32,
    /// Fake offset to pass to mmap on the device fd.
    pub offset: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeDestroyDumb {
    pub handle: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeGetPlaneRes {
    pub plane_id_ptr: u64,
    pub count_planes: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeGetPlane {
    pub plane_id: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub possible_crtcs: u32,
    pub gamma_size: u32,
    pub count_format_types: u32,
    pub format_type_ptr: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmModeSetPlane {
    pub plane_id: u32,
    pub crtc_id: u32,
    pub fb_id: u32,
    pub flags: u32,
    pub crtc_x: i32,
    pub crtc_y: i32,
    pub crtc_w: u32,
    pub crtc_h: u32,
    // Source rectangle in 16.16 fixed point.
    pub src_x: u32,
    pub src_y: u32,
    pub src_h: u32,
    pub src_w: u32,
}

impl_zeroed!(
    DrmVersion,
    DrmGemClose,
    DrmGemFlink,
    DrmGemOpen,
    DrmPrimeHandle,
    DrmModeInfo,
    DrmModeCardRes,
    DrmModeCrtc,
    DrmModeGetEncoder,
    DrmModeGetConnector,
    DrmModeFbCmd,
    DrmModeFbCmd2,
    DrmModeCrtcPageFlip,
    DrmModeCreateDumb,
    DrmModeMapDumb,
    DrmModeDestroyDumb,
    DrmModeGetPlaneRes,
    DrmModeGetPlane,
    DrmModeSetPlane,
);

// ── Events read from the device fd ──

pub const DRM_EVENT_VBLANK: u32 = 0x01;
pub const DRM_EVENT_FLIP_COMPLETE: u32 = 0x02;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmEvent {
    pub type_: u32,
    /// Total length of this event record including the header.
    pub length: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DrmEventVblank {
    pub base: DrmEvent,
    pub user_data: u64,
    pub tv_sec: u32,
    pub tv_usec: u32,
    pub sequence: u32,
    pub reserved: u32,
}

// ── Pixel formats (fourcc) ──

pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

pub const DRM_FORMAT_XRGB8888: u32 = fourcc(b'X', b'R', b'2', b'4');
pub const DRM_FORMAT_ARGB8888: u32 = fourcc(b'A', b'R', b'2', b'4');
pub const DRM_FORMAT_RGBA8888: u32 = fourcc(b'R', b'A', b'2', b'4');
pub const DRM_FORMAT_RGB565: u32 = fourcc(b'R', b'G', b'1', b'6');
pub const DRM_FORMAT_NV12: u32 = fourcc(b'N', b'V', b'1', b'2');
pub const DRM_FORMAT_YUV444: u32 = fourcc(b'Y', b'U', b'2', b'4');

// ── ioctl definitions ──

nix::ioctl_readwrite!(drm_ioctl_version, DRM_IOCTL_BASE, DRM_NR_VERSION, DrmVersion);
nix::ioctl_write_ptr!(drm_ioctl_gem_close, DRM_IOCTL_BASE, DRM_NR_GEM_CLOSE, DrmGemClose);
nix::ioctl_readwrite!(drm_ioctl_gem_flink, DRM_IOCTL_BASE, DRM_NR_GEM_FLINK, DrmGemFlink);
nix::ioctl_readwrite!(drm_ioctl_gem_open, DRM_IOCTL_BASE, DRM_NR_GEM_OPEN, DrmGemOpen);
nix::ioctl_readwrite!(
    drm_ioctl_prime_handle_to_fd,
    DRM_IOCTL_BASE,
    DRM_NR_PRIME_HANDLE_TO_FD,
    DrmPrimeHandle
);
nix::ioctl_readwrite!(
    drm_ioctl_prime_fd_to_handle,
    DRM_IOCTL_BASE,
    DRM_NR_PRIME_FD_TO_HANDLE,
    DrmPrimeHandle
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_getresources,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_GETRESOURCES,
    DrmModeCardRes
);
nix::ioctl_readwrite!(drm_ioctl_mode_getcrtc, DRM_IOCTL_BASE, DRM_NR_MODE_GETCRTC, DrmModeCrtc);
nix::ioctl_readwrite!(drm_ioctl_mode_setcrtc, DRM_IOCTL_BASE, DRM_NR_MODE_SETCRTC, DrmModeCrtc);
nix::ioctl_readwrite!(
    drm_ioctl_mode_getencoder,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_GETENCODER,
    DrmModeGetEncoder
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_getconnector,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_GETCONNECTOR,
    DrmModeGetConnector
);
nix::ioctl_readwrite!(drm_ioctl_mode_getfb, DRM_IOCTL_BASE, DRM_NR_MODE_GETFB, DrmModeFbCmd);
nix::ioctl_readwrite!(drm_ioctl_mode_addfb, DRM_IOCTL_BASE, DRM_NR_MODE_ADDFB, DrmModeFbCmd);
nix::ioctl_readwrite!(drm_ioctl_mode_addfb2, DRM_IOCTL_BASE, DRM_NR_MODE_ADDFB2, DrmModeFbCmd2);
nix::ioctl_readwrite!(drm_ioctl_mode_rmfb, DRM_IOCTL_BASE, DRM_NR_MODE_RMFB, libc::c_uint);
nix::ioctl_readwrite!(
    drm_ioctl_mode_page_flip,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_PAGE_FLIP,
    DrmModeCrtcPageFlip
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_create_dumb,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_CREATE_DUMB,
    DrmModeCreateDumb
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_map_dumb,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_MAP_DUMB,
    DrmModeMapDumb
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_destroy_dumb,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_DESTROY_DUMB,
    DrmModeDestroyDumb
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_getplaneresources,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_GETPLANERESOURCES,
    DrmModeGetPlaneRes
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_getplane,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_GETPLANE,
    DrmModeGetPlane
);
nix::ioctl_readwrite!(
    drm_ioctl_mode_setplane,
    DRM_IOCTL_BASE,
    DRM_NR_MODE_SETPLANE,
    DrmModeSetPlane
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_record_sizes_match_kernel_abi() {
        assert_eq!(size_of::<DrmGemClose>(), 8);
        assert_eq!(size_of::<DrmGemFlink>(), 8);
        assert_eq!(size_of::<DrmGemOpen>(), 16);
        assert_eq!(size_of::<DrmPrimeHandle>(), 12);
        assert_eq!(size_of::<DrmModeInfo>(), 68);
        assert_eq!(size_of::<DrmModeCardRes>(), 64);
        assert_eq!(size_of::<DrmModeCrtc>(), 36 + 68);
        assert_eq!(size_of::<DrmModeGetEncoder>(), 20);
        assert_eq!(size_of::<DrmModeGetConnector>(), 80);
        assert_eq!(size_of::<DrmModeFbCmd>(), 28);
        assert_eq!(size_of::<DrmModeFbCmd2>(), 68);
        assert_eq!(size_of::<DrmModeCrtcPageFlip>(), 24);
        assert_eq!(size_of::<DrmModeCreateDumb>(), 32);
        assert_eq!(size_of::<DrmModeMapDumb>(), 16);
        assert_eq!(size_of::<DrmModeSetPlane>(), 48);
        assert_eq!(size_of::<DrmEvent>(), 8);
        assert_eq!(size_of::<DrmEventVblank>(), 32);
    }

    #[test]
    fn test_fourcc_encoding() {
        // 'X' 'R' '2' '4' little endian
        assert_eq!(DRM_FORMAT_XRGB8888, 0x34325258);
        assert_eq!(DRM_FORMAT_NV12, 0x3231564e);
    }

    #[test]
    fn test_mode_name_str() {
        let mut mode = DrmModeInfo::zeroed();
        mode.name[..9].copy_from_slice(b"720x1280\0");
        assert_eq!(mode.name_str(), "720x1280");
    }

    #[test]
    fn test_zeroed_records() {
        let res = DrmModeCardRes::zeroed();
        assert_eq!(res.count_connectors, 0);
        assert_eq!(res.fb_id_ptr, 0);

        let flip = DrmModeCrtcPageFlip::default();
        assert_eq!(flip.flags, 0);
    }
}
