//! QPI quality-probe interface: CRC capture of the output and
//! destination paths, input test patterns, capture clock selection.

use drm_core::error::{ioctl_err, Result};
use drm_core::Device;

use crate::sys::{self, MAX_CRC_SIZE};

/// Per-channel CRC rows from the output capture, `param_cnt` entries
/// valid per array.
#[derive(Debug, Clone)]
pub struct OutCrc {
    pub out_1_r: Vec<u32>,
    pub out_1_g: Vec<u32>,
    pub out_1_b: Vec<u32>,
    pub out_2_r: Vec<u32>,
    pub out_2_g: Vec<u32>,
    pub out_2_b: Vec<u32>,
}

/// Luma/chroma CRC rows from the destination capture.
#[derive(Debug, Clone)]
pub struct DstCrc {
    pub luma_top: Vec<u32>,
    pub chrome_top: Vec<u32>,
}

fn take(arr: &[u32; MAX_CRC_SIZE], cnt: usize) -> Vec<u32> {
    arr[..cnt.min(MAX_CRC_SIZE)].to_vec()
}

/// Arm the output-CRC capture. Call before `get_out_crc`.
pub fn set_ready_get_out_crc(dev: &Device, on: bool) -> Result<()> {
    let mut arg: u32 = on as u32;
    unsafe { sys::sdp_ioctl_qpi_set_ready_get_out_crc(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_QPI_SET_READY_GET_OUT_CRC", e))?;
    Ok(())
}

/// Read up to `count` captured output CRC rows.
pub fn get_out_crc(dev: &Device, count: u32) -> Result<OutCrc> {
    let mut arg = sys::SdpQpiCrc::zeroed();
    arg.param_cnt = count.min(MAX_CRC_SIZE as u32);
    unsafe { sys::sdp_ioctl_qpi_get_out_crc(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_QPI_GET_OUT_CRC", e))?;
    let cnt = arg.param_cnt as usize;
    let out = unsafe { &arg.rslt_crc.out };
    Ok(OutCrc {
        out_1_r: take(&out.a_out_1_r, cnt),
        out_1_g: take(&out.a_out_1_g, cnt),
        out_1_b: take(&out.a_out_1_b, cnt),
        out_2_r: take(&out.a_out_2_r, cnt),
        out_2_g: take(&out.a_out_2_g, cnt),
        out_2_b: take(&out.a_out_2_b, cnt),
    })
}

/// Read up to `count` destination CRC rows. `nrfc_mode` nonzero runs
/// the capture through the NRFC test path.
pub fn get_dst_crc(dev: &Device, count: u32, nrfc_mode: u32) -> Result<DstCrc> {
    let mut arg = sys::SdpQpiCrc::zeroed();
    arg.param_cnt = count.min(MAX_CRC_SIZE as u32);
    arg.param.test_nrfcmode = nrfc_mode;
    unsafe { sys::sdp_ioctl_qpi_get_dst_crc(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_QPI_GET_DST_CRC", e))?;
    let cnt = arg.param_cnt as usize;
    let dst = unsafe { &arg.rslt_crc.dst };
    Ok(DstCrc {
        luma_top: take(&dst.a_luma_top, cnt),
        chrome_top: take(&dst.a_chrome_top, cnt),
    })
}

/// Feed a hardware test pattern into a plane.
pub fn set_input_test_pattern(
    dev: &Device,
    plane_type: u32,
    on: bool,
    pattern_type: u32,
) -> Result<()> {
    let mut arg = sys::SdpQpiInputPattern::zeroed();
    arg.plane_type = plane_type;
    arg.onoff_flag = on as u32;
    arg.pattern_type = pattern_type;
    unsafe { sys::sdp_ioctl_qpi_set_input_test_pattern(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_QPI_SET_INPUT_TEST_PATTERN", e))?;
    Ok(())
}

/// Select the input-capture clock for a plane.
pub fn set_incapt_clock_sel(
    dev: &Device,
    plane_type: u32,
    clksel: u32,
    invert: u32,
    delay: u32,
) -> Result<()> {
    let mut arg = sys::SdpQpiIncaptClockSel::zeroed();
    arg.plane_type = plane_type;
    arg.clksel = clksel;
    arg.invert = invert;
    arg.delay = delay;
    unsafe { sys::sdp_ioctl_qpi_set_incapt_clock_sel(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_QPI_SET_INCAPT_CLOCK_SEL", e))?;
    Ok(())
}

/// Gate graphics-plane sync updates.
pub fn set_gp_sync(dev: &Device, on: bool) -> Result<()> {
    let mut arg: u32 = on as u32;
    unsafe { sys::sdp_ioctl_qpi_set_gp_synconoff(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_SDP_QPI_SET_GP_SYNCONOFF", e))?;
    Ok(())
}
