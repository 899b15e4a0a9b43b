//! Raw bindings to the Exynos DRM vendor ABI.
//!
//! GEM records mirror the kernel's `exynos_drm.h`. The G2D and IPP
//! records follow the same driver generation the test programs were
//! written against; the command numbers sit on top of
//! [`drm_core::sys::DRM_COMMAND_BASE`].

use drm_core::impl_zeroed;
use drm_core::sys::{DrmEvent, DRM_IOCTL_BASE};

// ── Vendor command numbers (offset from DRM_COMMAND_BASE) ──

pub const DRM_EXYNOS_GEM_CREATE: u8 = 0x00;
pub const DRM_EXYNOS_GEM_MAP_OFFSET: u8 = 0x01;
pub const DRM_EXYNOS_GEM_MMAP: u8 = 0x02;
pub const DRM_EXYNOS_GEM_USERPTR_IMP: u8 = 0x03;
pub const DRM_EXYNOS_PLANE_SET_ZPOS: u8 = 0x05;
pub const DRM_EXYNOS_GEM_EXPORT_UMP: u8 = 0x10;
pub const DRM_EXYNOS_GEM_CACHE_OP: u8 = 0x12;
pub const DRM_EXYNOS_GEM_GET_PHY: u8 = 0x13;
pub const DRM_EXYNOS_GEM_PHY_IMP: u8 = 0x14;
pub const DRM_EXYNOS_G2D_GET_VER: u8 = 0x20;
pub const DRM_EXYNOS_G2D_SET_CMDLIST: u8 = 0x21;
pub const DRM_EXYNOS_G2D_EXEC: u8 = 0x22;
pub const DRM_EXYNOS_IPP_PROPERTY: u8 = 0x30;
pub const DRM_EXYNOS_IPP_BUF: u8 = 0x31;
pub const DRM_EXYNOS_IPP_CTRL: u8 = 0x32;

const fn cmd(nr: u8) -> u8 {
    drm_core::sys::DRM_COMMAND_BASE + nr
}

// ── GEM memory types ──

pub const EXYNOS_BO_CONTIG: u32 = 0;
pub const EXYNOS_BO_NONCONTIG: u32 = 1 << 0;
pub const EXYNOS_BO_CACHABLE: u32 = 1 << 1;
pub const EXYNOS_BO_WC: u32 = 1 << 2;

// ── Cache units and operations (combined into cache_op flags) ──

pub const EXYNOS_DRM_L1_CACHE: u32 = 1;
pub const EXYNOS_DRM_L2_CACHE: u32 = 2;
pub const EXYNOS_DRM_ALL_CACHE: u32 = 3;
pub const EXYNOS_DRM_CACHE_INV: u32 = 4;
pub const EXYNOS_DRM_CACHE_CLN: u32 = 8;
pub const EXYNOS_DRM_CACHE_FSH: u32 = 0xC;

// ── GEM records ──

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemCreate {
    /// Requested size; page-aligned by the kernel.
    pub size: u64,
    pub flags: u32,
    /// Returned handle.
    pub handle: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemUserptrImp {
    pub size: u32,
    pub user_ptr: u64,
    /// Returned handle.
    pub handle: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemMapOff {
    pub handle: u32,
    pub pad: u32,
    /// Returned fake offset for mmap on the device fd.
    pub offset: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemMmap {
    pub handle: u32,
    pub pad: u32,
    pub size: u64,
    /// Returned user virtual address.
    pub mapped: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemUmp {
    pub gem_handle: u32,
    /// Returned UMP secure id.
    pub secure_id: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemGetPhy {
    pub gem_handle: u32,
    pub pad: u32,
    pub size: u64,
    pub phy_addr: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemPhyImp {
    pub phy_addr: u64,
    pub size: u64,
    pub gem_handle: u32,
    pub pad: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosGemCacheOp {
    /// Must be a user space address.
    pub usr_addr: u64,
    pub size: u32,
    pub flags: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExynosPlaneSetZpos {
    pub plane_id: u32,
    pub zpos: i32,
}

// ── G2D ──

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct G2dGetVer {
    pub major: u32,
    pub minor: u32,
}

/// One register write in a command list.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G2dCmd {
    pub offset: u32,
    pub data: u32,
}

pub const G2D_EVENT_NOT: u64 = 0;
pub const G2D_EVENT_NONSTOP: u64 = 1;
pub const G2D_EVENT_STOP: u64 = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct G2dSetCmdlist {
    /// Pointer to plain register writes.
    pub cmd: u64,
    /// Pointer to writes whose data is a GEM handle the kernel patches
    /// to a device address.
    pub cmd_gem: u64,
    pub cmd_nr: u32,
    pub cmd_gem_nr: u32,
    pub event_type: u64,
    /// Echoed in the completion event.
    pub user_data: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct G2dExec {
    /// Nonzero requests asynchronous execution.
    pub async_: u64,
}

// ── IPP (rotator, FIMC, writeback) ──

pub const EXYNOS_DRM_OPS_SRC: usize = 0;
pub const EXYNOS_DRM_OPS_DST: usize = 1;
pub const EXYNOS_DRM_OPS_MAX: usize = 2;

pub const EXYNOS_DRM_PLANAR_Y: usize = 0;
pub const EXYNOS_DRM_PLANAR_CB: usize = 1;
pub const EXYNOS_DRM_PLANAR_CR: usize = 2;
pub const EXYNOS_DRM_PLANAR_MAX: usize = 3;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IppFlip {
    None = 0,
    Vertical = 1,
    Horizontal = 2,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IppDegree {
    D0 = 0,
    D90 = 1,
    D180 = 2,
    D270 = 3,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IppCmd {
    M2m = 0,
    Wb = 1,
    Output = 2,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IppBufCtrl {
    Map = 0,
    Unmap = 1,
    Queue = 2,
    Dequeue = 3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExynosSz {
    pub hsize: u32,
    pub vsize: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExynosPos {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Per-direction (source or destination) IPP configuration.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IppConfig {
    pub ops_id: u32,
    pub flip: u32,
    pub degree: u32,
    /// fourcc pixel format.
    pub fmt: u32,
    pub sz: ExynosSz,
    pub pos: ExynosPos,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IppProperty {
    pub config: [IppConfig; EXYNOS_DRM_OPS_MAX],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IppBuf {
    pub ops_id: u32,
    pub buf_ctrl: u32,
    pub user_data: u32,
    /// Buffer slot id; echoed back as `buf_idx` in the frame-done event.
    pub id: u32,
    pub handle: [u32; EXYNOS_DRM_PLANAR_MAX],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IppCtrl {
    pub cmd: u32,
    /// 1 starts the operation, 0 stops it.
    pub use_: u32,
}

impl_zeroed!(
    ExynosGemCreate,
    ExynosGemUserptrImp,
    ExynosGemMapOff,
    ExynosGemMmap,
    ExynosGemUmp,
    ExynosGemGetPhy,
    ExynosGemPhyImp,
    ExynosGemCacheOp,
    ExynosPlaneSetZpos,
    G2dGetVer,
    G2dCmd,
    G2dSetCmdlist,
    G2dExec,
    IppConfig,
    IppProperty,
    IppBuf,
    IppCtrl,
);

// ── Vendor events ──

pub const DRM_EXYNOS_G2D_EVENT: u32 = 0x8000_0000;
pub const DRM_EXYNOS_IPP_EVENT: u32 = 0x8000_0001;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct G2dEvent {
    pub base: DrmEvent,
    pub user_data: u64,
    pub tv_sec: u32,
    pub tv_usec: u32,
    pub cmdlist_no: u32,
    pub reserved: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IppEvent {
    pub base: DrmEvent,
    pub user_data: u64,
    pub tv_sec: u32,
    pub tv_usec: u32,
    /// Buffer slot that finished; re-queue it to keep streaming.
    pub buf_idx: u32,
    pub reserved: u32,
}

// ── ioctl definitions ──

nix::ioctl_readwrite!(
    exynos_ioctl_gem_create,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_CREATE),
    ExynosGemCreate
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_map_offset,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_MAP_OFFSET),
    ExynosGemMapOff
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_mmap,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_MMAP),
    ExynosGemMmap
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_userptr_imp,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_USERPTR_IMP),
    ExynosGemUserptrImp
);
nix::ioctl_readwrite!(
    exynos_ioctl_plane_set_zpos,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_PLANE_SET_ZPOS),
    ExynosPlaneSetZpos
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_export_ump,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_EXPORT_UMP),
    ExynosGemUmp
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_cache_op,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_CACHE_OP),
    ExynosGemCacheOp
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_get_phy,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_GET_PHY),
    ExynosGemGetPhy
);
nix::ioctl_readwrite!(
    exynos_ioctl_gem_phy_imp,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_GEM_PHY_IMP),
    ExynosGemPhyImp
);
nix::ioctl_readwrite!(
    exynos_ioctl_g2d_get_ver,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_G2D_GET_VER),
    G2dGetVer
);
nix::ioctl_readwrite!(
    exynos_ioctl_g2d_set_cmdlist,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_G2D_SET_CMDLIST),
    G2dSetCmdlist
);
nix::ioctl_readwrite!(
    exynos_ioctl_g2d_exec,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_G2D_EXEC),
    G2dExec
);
nix::ioctl_readwrite!(
    exynos_ioctl_ipp_property,
    DRM_IOCTL_BASE,
    cmd(DRM_EXYNOS_IPP_PROPERTY),
    IppProperty
);
nix::ioctl_readwrite!(exynos_ioctl_ipp_buf, DRM_IOCTL_BASE, cmd(DRM_EXYNOS_IPP_BUF), IppBuf);
nix::ioctl_readwrite!(exynos_ioctl_ipp_ctrl, DRM_IOCTL_BASE, cmd(DRM_EXYNOS_IPP_CTRL), IppCtrl);

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_gem_record_sizes() {
        assert_eq!(size_of::<ExynosGemCreate>(), 16);
        assert_eq!(size_of::<ExynosGemUserptrImp>(), 24);
        assert_eq!(size_of::<ExynosGemMapOff>(), 16);
        assert_eq!(size_of::<ExynosGemMmap>(), 24);
        assert_eq!(size_of::<ExynosGemUmp>(), 8);
        assert_eq!(size_of::<ExynosGemGetPhy>(), 24);
        assert_eq!(size_of::<ExynosGemPhyImp>(), 24);
        assert_eq!(size_of::<ExynosGemCacheOp>(), 16);
        assert_eq!(size_of::<ExynosPlaneSetZpos>(), 8);
    }

    #[test]
    fn test_g2d_ipp_record_sizes() {
        assert_eq!(size_of::<G2dCmd>(), 8);
        assert_eq!(size_of::<G2dSetCmdlist>(), 40);
        assert_eq!(size_of::<G2dExec>(), 8);
        assert_eq!(size_of::<IppConfig>(), 40);
        assert_eq!(size_of::<IppProperty>(), 80);
        assert_eq!(size_of::<IppBuf>(), 28);
        assert_eq!(size_of::<IppCtrl>(), 8);
        assert_eq!(size_of::<G2dEvent>(), 32);
        assert_eq!(size_of::<IppEvent>(), 32);
    }

    #[test]
    fn test_cache_flag_composition() {
        assert_eq!(
            EXYNOS_DRM_ALL_CACHE,
            EXYNOS_DRM_L1_CACHE | EXYNOS_DRM_L2_CACHE
        );
        assert_eq!(
            EXYNOS_DRM_CACHE_FSH,
            EXYNOS_DRM_CACHE_INV | EXYNOS_DRM_CACHE_CLN
        );
    }
}
