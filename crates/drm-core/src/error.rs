//! DRM error types.

use std::fmt;

#[derive(Debug)]
pub enum DrmError {
    /// Opening a device node failed.
    Open { path: String, errno: i32 },
    /// No /dev/dri node answered to the requested driver name.
    DeviceNotFound(String),
    /// An ioctl was rejected by the kernel.
    Ioctl { op: &'static str, errno: i32 },
    /// mmap of a buffer object failed.
    MmapFailed(i32),
    /// Reading the event stream failed.
    EventRead(i32),
    /// Caller passed something the kernel would reject anyway.
    InvalidArgument(&'static str),
    /// A resource id (connector, crtc, mode) was not found.
    NotFound(&'static str),
}

impl fmt::Display for DrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, errno } => write!(f, "open {}: errno {}", path, errno),
            Self::DeviceNotFound(name) => write!(f, "no DRM device named {}", name),
            Self::Ioctl { op, errno } => write!(f, "ioctl {}: errno {}", op, errno),
            Self::MmapFailed(e) => write!(f, "mmap failed: errno {}", e),
            Self::EventRead(e) => write!(f, "event read failed: errno {}", e),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Self::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for DrmError {}

pub type Result<T> = std::result::Result<T, DrmError>;

/// Map a nix ioctl failure into `DrmError::Ioctl`, logging the rejection.
pub fn ioctl_err(op: &'static str, e: nix::errno::Errno) -> DrmError {
    crate::derror!("ioctl {} failed: {}", op, e);
    DrmError::Ioctl { op, errno: e as i32 }
}

/// Thread-local errno after a raw libc call.
pub fn last_errno() -> i32 {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "android")] {
            unsafe { *libc::__errno() }
        } else {
            unsafe { *libc::__errno_location() }
        }
    }
}
