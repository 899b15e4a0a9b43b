//! Raw bindings to the SDP DRM vendor ABI.
//!
//! C enums are four bytes on this ABI, so the records carry them as
//! `u32` fields with `Sdp*` constants. Buffer addresses cross the
//! boundary as `*mut c_void`, matching the kernel header.

use drm_core::impl_zeroed;
use drm_core::sys::DRM_IOCTL_BASE;

use libc::c_void;

// ── Vendor command numbers (offset from DRM_COMMAND_BASE) ──

pub const DRM_SDP_GEM_CREATE: u8 = 0x00;
pub const DRM_SDP_GA_EXEC: u8 = 0x40;
pub const DRM_SDP_QPI_GET_DST_CRC: u8 = 0x50;
pub const DRM_SDP_QPI_GET_OUT_CRC: u8 = 0x52;
pub const DRM_SDP_QPI_SET_INPUT_TEST_PATTERN: u8 = 0x53;
pub const DRM_SDP_QPI_SET_INCAPT_CLOCK_SEL: u8 = 0x54;
pub const DRM_SDP_QPI_SET_READY_GET_OUT_CRC: u8 = 0x55;
pub const DRM_SDP_QPI_SET_GP_SYNCONOFF: u8 = 0x56;

const fn cmd(nr: u8) -> u8 {
    drm_core::sys::DRM_COMMAND_BASE + nr
}

// ── GEM memory types (low two bits of the create flags) ──

pub const SDP_DRM_GEM_CONTIG: u32 = 0x0;
pub const SDP_DRM_GEM_NONCONTIG: u32 = 0x1;
pub const SDP_DRM_GEM_MP: u32 = 0x2;
pub const SDP_DRM_GEM_HW: u32 = 0x3;

pub const fn sdp_drm_gem_type(flags: u32) -> u32 {
    flags & 0x3
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SdpGemCreate {
    pub size: u64,
    pub flags: u32,
    /// Returned handle.
    pub handle: u32,
}

// ── GA (2D accelerator) ──

pub const SDP_GA_SOLID_FILL: u32 = 0;
pub const SDP_GA_COPY: u32 = 1;
pub const SDP_GA_SCALE: u32 = 2;
pub const SDP_GA_ROP: u32 = 3;

/// Pixel depths for `SdpGaPixmap::bit_depth`, in bytes per pixel.
pub const SDP_GA_BPP8: u32 = 1;
pub const SDP_GA_BPP16: u32 = 2;
pub const SDP_GA_BPP32: u32 = 4;

/// GA color modes.
pub const GFX_GA_FORMAT_32BPP_ARGB: u32 = 0;
pub const GFX_GA_FORMAT_32BPP_RGBA: u32 = 1;
pub const GFX_GA_FORMAT_16BPP: u32 = 2;
pub const GFX_GA_FORMAT_8BPP: u32 = 3;

/// Bitblt/ROP engine modes.
pub const GA_BITBLT_MODE_NORMAL: u32 = 0;
pub const GA_BITBLT_MODE_PREALPHA: u32 = 1;
pub const GA_BITBLT_MODE_CA: u32 = 2;
pub const GA_BITBLT_MODE_SRC: u32 = 3;
pub const GA_BLOCKFILL_MODE: u32 = 4;
pub const GA_MHP_ROP_CA_VALUE_MODE: u32 = 5;
pub const GA_MHP_FILLED_ROP_CA_VALUE_MODE: u32 = 6;
pub const GA_SCALE_MODE: u32 = 7;
pub const GA_SCALEDROP_MODE: u32 = 8;

/// Raster operations.
pub const S_ROP_COPY: u32 = 0;
pub const S_ROP_ALPHA: u32 = 1;
pub const S_ROP_TRANSPARENT: u32 = 2;
pub const S_ROP_DVB_SRC: u32 = 3;
pub const S_ROP_DVB_SRC_OVER: u32 = 4;
pub const S_ROP_DVB_DST_OVER: u32 = 5;
pub const S_ROP_XOR: u32 = 11;

pub const GA_PREMULTIPY_ALPHA_OFF_SHADOW: u32 = 1;
pub const GA_PREMULTIPY_ALPHA_ON_SHADOW: u32 = 3;

pub const GA_SRC1_FILLCOLOR_SRC2_IMAGE: u32 = 0;
pub const GA_SRC1_IMAGE_SRC2_FILLCOLOR: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdpGaRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SdpGaPixmap {
    pub bit_depth: u32,
    pub width: u32,
    pub height: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpGaSolidFill {
    pub color_mode: u32,
    pub pixmap: SdpGaPixmap,
    /// Physical address; 0 when `handle` names the buffer instead.
    pub paddr: *mut c_void,
    pub handle: u32,
    pub hbyte_size: u32,
    pub h_start: u32,
    pub v_start: u32,
    pub h_size: u32,
    pub v_size: u32,
    pub color: u32,
    pub stride: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpGaBitblt {
    pub color_mode: u32,
    pub ga_mode: u32,
    pub src1_paddr: *mut c_void,
    pub src1_handle: u32,
    pub src1_byte_size: u32,
    pub src1_rect: SdpGaRect,
    pub dst_paddr: *mut c_void,
    pub dst_handle: u32,
    pub dst_byte_size: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub ca_value: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpGaScale {
    pub color_mode: u32,
    pub src_paddr: *mut c_void,
    pub src_handle: u32,
    pub src_hbyte_size: u32,
    pub src_rect: SdpGaRect,
    pub dst_paddr: *mut c_void,
    pub dst_handle: u32,
    pub dst_hbyte_size: u32,
    pub dst_rect: SdpGaRect,
    pub rop_mode: u32,
    pub pre_mul_alpha: u32,
    pub rop_ca_value: u32,
    pub src_key: u32,
    pub rop_on_off: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpGaMhpConst {
    pub rop_mode: u32,
    pub color_key: u32,
    pub ca_value: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union SdpGaRopMode {
    pub mhp_const: SdpGaMhpConst,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpGaRop {
    pub ga_mode: u32,
    pub color_mode: u32,
    pub pre_mul_alpha: u32,
    pub src1_paddr: *mut c_void,
    pub src1_handle: u32,
    pub src1_byte_size: u32,
    pub src1_rect: SdpGaRect,
    pub dst_paddr: *mut c_void,
    pub dst_handle: u32,
    pub dst_byte_size: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub fill_color: u32,
    pub rop_mode: SdpGaRopMode,
    pub filled_rop_mode: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union SdpGaOp {
    pub solid_fill: SdpGaSolidFill,
    pub bitblt: SdpGaBitblt,
    pub scale: SdpGaScale,
    pub rop: SdpGaRop,
}

/// Dispatch record: one op type plus the matching union arm.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpGaExec {
    pub ga_op_type: u32,
    pub ga_op: SdpGaOp,
}

impl SdpGaExec {
    pub fn zeroed() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

// ── QPI ──

pub const MAX_CRC_SIZE: usize = 30;

/// Plane types for the QPI test-pattern and clock-select records.
pub const DRM_SDP_PLANE_OSDP: u32 = 0;
pub const DRM_SDP_PLANE_GP: u32 = 1;
pub const DRM_SDP_PLANE_SGP: u32 = 2;
pub const DRM_SDP_PLANE_CURSOR1: u32 = 3;
pub const DRM_SDP_PLANE_CURSOR2: u32 = 4;
pub const DRM_SDP_PLANE_DP_MAIN: u32 = 5;
pub const DRM_SDP_PLANE_DP_SUB: u32 = 6;
pub const DRM_SDP_PLANE_DP_SUB2: u32 = 7;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpQpiOutCrc {
    pub a_out_1_r: [u32; MAX_CRC_SIZE],
    pub a_out_1_g: [u32; MAX_CRC_SIZE],
    pub a_out_1_b: [u32; MAX_CRC_SIZE],
    pub a_out_2_r: [u32; MAX_CRC_SIZE],
    pub a_out_2_g: [u32; MAX_CRC_SIZE],
    pub a_out_2_b: [u32; MAX_CRC_SIZE],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpQpiDstCrc {
    pub a_luma_top: [u32; MAX_CRC_SIZE],
    pub a_chrome_top: [u32; MAX_CRC_SIZE],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union SdpQpiParam {
    /// Out-CRC variant, unused.
    pub reserved: u32,
    /// Dst-CRC variant: NRFC test mode, 0 disables.
    pub test_nrfcmode: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union SdpQpiRslt {
    pub out: SdpQpiOutCrc,
    pub dst: SdpQpiDstCrc,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SdpQpiCrc {
    pub param_cnt: u32,
    pub param: SdpQpiParam,
    pub rslt_crc: SdpQpiRslt,
}

impl SdpQpiCrc {
    pub fn zeroed() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SdpQpiInputPattern {
    pub plane_type: u32,
    pub onoff_flag: u32,
    pub pattern_type: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SdpQpiIncaptClockSel {
    pub plane_type: u32,
    pub clksel: u32,
    pub invert: u32,
    pub delay: u32,
}

impl_zeroed!(
    SdpGemCreate,
    SdpGaRect,
    SdpGaPixmap,
    SdpQpiInputPattern,
    SdpQpiIncaptClockSel,
);

// ── ioctl definitions ──

nix::ioctl_readwrite!(
    sdp_ioctl_gem_create,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_GEM_CREATE),
    SdpGemCreate
);
nix::ioctl_readwrite!(sdp_ioctl_ga_exec, DRM_IOCTL_BASE, cmd(DRM_SDP_GA_EXEC), SdpGaExec);
nix::ioctl_readwrite!(
    sdp_ioctl_qpi_get_dst_crc,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_QPI_GET_DST_CRC),
    SdpQpiCrc
);
nix::ioctl_readwrite!(
    sdp_ioctl_qpi_get_out_crc,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_QPI_GET_OUT_CRC),
    SdpQpiCrc
);
nix::ioctl_readwrite!(
    sdp_ioctl_qpi_set_input_test_pattern,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_QPI_SET_INPUT_TEST_PATTERN),
    SdpQpiInputPattern
);
nix::ioctl_readwrite!(
    sdp_ioctl_qpi_set_incapt_clock_sel,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_QPI_SET_INCAPT_CLOCK_SEL),
    SdpQpiIncaptClockSel
);
nix::ioctl_readwrite!(
    sdp_ioctl_qpi_set_ready_get_out_crc,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_QPI_SET_READY_GET_OUT_CRC),
    u32
);
nix::ioctl_readwrite!(
    sdp_ioctl_qpi_set_gp_synconoff,
    DRM_IOCTL_BASE,
    cmd(DRM_SDP_QPI_SET_GP_SYNCONOFF),
    u32
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_record_sizes() {
        assert_eq!(size_of::<SdpGemCreate>(), 16);
        assert_eq!(size_of::<SdpGaRect>(), 16);
        assert_eq!(size_of::<SdpGaPixmap>(), 12);
        assert_eq!(size_of::<SdpQpiInputPattern>(), 12);
        assert_eq!(size_of::<SdpQpiIncaptClockSel>(), 16);
    }

    #[test]
    fn test_zeroed_records() {
        assert_eq!(SdpGaRect::zeroed(), SdpGaRect::default());
        let pm = SdpGaPixmap::default();
        assert_eq!((pm.bit_depth, pm.width, pm.height), (0, 0, 0));
    }

    #[test]
    fn test_qpi_crc_union_sizes() {
        assert_eq!(size_of::<SdpQpiOutCrc>(), 6 * MAX_CRC_SIZE * 4);
        assert_eq!(size_of::<SdpQpiDstCrc>(), 2 * MAX_CRC_SIZE * 4);
        // The union takes the larger arm.
        assert_eq!(size_of::<SdpQpiRslt>(), size_of::<SdpQpiOutCrc>());
    }

    #[test]
    fn test_ga_exec_union_takes_widest_arm() {
        assert!(size_of::<SdpGaOp>() >= size_of::<SdpGaScale>());
        assert!(size_of::<SdpGaOp>() >= size_of::<SdpGaRop>());
        assert_eq!(
            size_of::<SdpGaExec>(),
            size_of::<SdpGaOp>() + size_of::<*mut libc::c_void>().max(4)
        );
    }

    #[test]
    fn test_gem_type_mask() {
        assert_eq!(sdp_drm_gem_type(SDP_DRM_GEM_HW | 0xf0), SDP_DRM_GEM_HW);
    }
}
