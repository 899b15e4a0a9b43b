//! # drm-sdp
//!
//! SDP DRM vendor ABI: GEM buffer objects (vendor and dumb-buffer
//! allocation, CPU mapping, flink/PRIME sharing), the GA 2D accelerator
//! (solid fill, bitblt, scaled blit, ROP blend) and the QPI quality
//! probe (CRC capture, input test patterns, capture clock selection).
//!
//! ## Modules
//!
//! - `sys` - repr(C) records, unions and ioctl numbers
//! - `bo`  - buffer-object lifecycle on an open device
//! - `ga`  - 2D accelerator operations
//! - `qpi` - quality-probe wrappers

#![allow(dead_code)]

pub mod bo;
pub mod ga;
pub mod qpi;
pub mod sys;

pub use bo::SdpBo;

/// Driver name reported by DRM_IOCTL_VERSION.
pub const DRIVER_NAME: &str = "sdp";

/// Open the SDP DRM device by driver name.
pub fn open_device() -> drm_core::Result<drm_core::Device> {
    drm_core::Device::open_by_name(DRIVER_NAME)
}
