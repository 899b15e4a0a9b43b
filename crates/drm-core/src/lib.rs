//! # drm-core
//!
//! Core DRM/KMS userspace plumbing shared by the vendor crates.
//!
//! This crate speaks the device-independent part of the DRM ioctl ABI:
//! device open/version, GEM name and PRIME sharing, mode setting (CRTCs,
//! connectors, encoders, framebuffers, planes, dumb buffers) and the
//! event stream read from the DRM file descriptor.
//!
//! ## Modules
//!
//! - `sys` - repr(C) ioctl records and ioctl definitions
//! - `device` - owned DRM device file descriptor
//! - `mode` - mode-setting wrappers (two-call array fetch pattern)
//! - `gem` - GEM flink/open and PRIME fd sharing
//! - `event` - DRM event wait/read/dispatch
//! - `error` - error types
//! - `dlog` - leveled debug printing macros
//! - `env` - environment variable utilities

#![allow(dead_code)]

pub mod device;
pub mod dlog;
pub mod env;
pub mod error;
pub mod event;
pub mod gem;
pub mod mode;
pub mod sys;

// Re-exports for convenience
pub use device::{Device, DriverVersion};
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};
pub use error::{ioctl_err, last_errno, DrmError, Result};
pub use event::{EventHandler, PageFlipEvent};
