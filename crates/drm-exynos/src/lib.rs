//! # drm-exynos
//!
//! Exynos DRM vendor ABI: GEM allocation and mapping, cache maintenance,
//! plane z-order, UMP/physical-memory export and import, the G2D 2D
//! accelerator command-list interface and the IPP post-processing
//! (rotator, FIMC) interface.
//!
//! Every wrapper marshals one fixed-layout record into one ioctl on an
//! open [`drm_core::Device`]; outputs come back in the returned values.
//!
//! ## Modules
//!
//! - `sys` - repr(C) records, ioctl numbers, vendor event layouts
//! - `gem` - GEM create/map/import/export and cache ops
//! - `g2d` - G2D command-list builder and submission
//! - `ipp` - IPP property/buffer/control wrappers

#![allow(dead_code)]

pub mod g2d;
pub mod gem;
pub mod ipp;
pub mod sys;

/// Driver name reported by DRM_IOCTL_VERSION.
pub const DRIVER_NAME: &str = "exynos";

/// Open the Exynos DRM device by driver name.
pub fn open_device() -> drm_core::Result<drm_core::Device> {
    drm_core::Device::open_by_name(DRIVER_NAME)
}
