//! GA 2D accelerator: one call per operation, each filling the
//! `ga_exec` dispatch record and issuing the single ioctl.

use drm_core::error::{ioctl_err, Result};
use drm_core::Device;

use crate::sys::{self, SdpGaRect};

fn exec(dev: &Device, mut arg: sys::SdpGaExec) -> Result<()> {
    unsafe { sys::sdp_ioctl_ga_exec(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_GA_EXEC", e))?;
    Ok(())
}

/// Fill a rectangle of a 32bpp pixmap with a solid color.
#[allow(clippy::too_many_arguments)]
pub fn solid_fill(
    dev: &Device,
    handle: u32,
    width: u32,
    height: u32,
    rect: SdpGaRect,
    color: u32,
) -> Result<()> {
    let mut arg = sys::SdpGaExec::zeroed();
    arg.ga_op_type = sys::SDP_GA_SOLID_FILL;
    let fill = unsafe { &mut arg.ga_op.solid_fill };
    fill.color_mode = sys::GFX_GA_FORMAT_32BPP_ARGB;
    fill.pixmap.bit_depth = sys::SDP_GA_BPP32;
    fill.pixmap.width = width;
    fill.pixmap.height = height;
    fill.handle = handle;
    fill.hbyte_size = width * 4;
    fill.h_start = rect.x;
    fill.v_start = rect.y;
    fill.h_size = rect.w;
    fill.v_size = rect.h;
    fill.color = color;
    fill.stride = width * 4;
    exec(dev, arg)
}

/// Plain bitblt copy of `src_rect` into (dst_x, dst_y).
#[allow(clippy::too_many_arguments)]
pub fn copy(
    dev: &Device,
    src_handle: u32,
    src_pitch: u32,
    src_rect: SdpGaRect,
    dst_handle: u32,
    dst_pitch: u32,
    dst_x: u32,
    dst_y: u32,
) -> Result<()> {
    let mut arg = sys::SdpGaExec::zeroed();
    arg.ga_op_type = sys::SDP_GA_COPY;
    let blt = unsafe { &mut arg.ga_op.bitblt };
    blt.color_mode = sys::GFX_GA_FORMAT_32BPP_ARGB;
    blt.ga_mode = sys::GA_BITBLT_MODE_NORMAL;
    blt.src1_handle = src_handle;
    blt.src1_byte_size = src_pitch;
    blt.src1_rect = src_rect;
    blt.dst_handle = dst_handle;
    blt.dst_byte_size = dst_pitch;
    blt.dst_x = dst_x;
    blt.dst_y = dst_y;
    exec(dev, arg)
}

/// Stretch blit between two rectangles, plain copy ROP.
pub fn scale(
    dev: &Device,
    src_handle: u32,
    src_pitch: u32,
    src_rect: SdpGaRect,
    dst_handle: u32,
    dst_pitch: u32,
    dst_rect: SdpGaRect,
) -> Result<()> {
    let mut arg = sys::SdpGaExec::zeroed();
    arg.ga_op_type = sys::SDP_GA_SCALE;
    let sc = unsafe { &mut arg.ga_op.scale };
    sc.color_mode = sys::GFX_GA_FORMAT_32BPP_ARGB;
    sc.src_handle = src_handle;
    sc.src_hbyte_size = src_pitch;
    sc.src_rect = src_rect;
    sc.dst_handle = dst_handle;
    sc.dst_hbyte_size = dst_pitch;
    sc.dst_rect = dst_rect;
    sc.rop_mode = sys::S_ROP_COPY;
    sc.pre_mul_alpha = sys::GA_PREMULTIPY_ALPHA_OFF_SHADOW;
    sc.rop_on_off = 0;
    exec(dev, arg)
}

/// Blend `src_rect` over the destination with the given raster op and
/// constant alpha.
#[allow(clippy::too_many_arguments)]
pub fn rop(
    dev: &Device,
    src_handle: u32,
    src_pitch: u32,
    src_rect: SdpGaRect,
    dst_handle: u32,
    dst_pitch: u32,
    dst_x: u32,
    dst_y: u32,
    rop_mode: u32,
    ca_value: u32,
) -> Result<()> {
    let mut arg = sys::SdpGaExec::zeroed();
    arg.ga_op_type = sys::SDP_GA_ROP;
    let op = unsafe { &mut arg.ga_op.rop };
    op.ga_mode = sys::GA_MHP_ROP_CA_VALUE_MODE;
    op.color_mode = sys::GFX_GA_FORMAT_32BPP_ARGB;
    op.pre_mul_alpha = sys::GA_PREMULTIPY_ALPHA_OFF_SHADOW;
    op.src1_handle = src_handle;
    op.src1_byte_size = src_pitch;
    op.src1_rect = src_rect;
    op.dst_handle = dst_handle;
    op.dst_byte_size = dst_pitch;
    op.dst_x = dst_x;
    op.dst_y = dst_y;
    op.rop_mode.mhp_const = sys::SdpGaMhpConst {
        rop_mode,
        color_key: 0,
        ca_value,
    };
    op.filled_rop_mode = sys::GA_SRC1_IMAGE_SRC2_FILLCOLOR;
    exec(dev, arg)
}
