//! Buffer-manager error types.

use std::fmt;

#[derive(Debug)]
pub enum BufMgrError {
    /// Every backend candidate failed to initialize.
    NoBackend,
    /// A named backend failed to initialize.
    BackendInit { name: String },
    /// Caller passed an argument the manager rejects outright.
    InvalidArgument(&'static str),
    /// User-data key already present.
    KeyExists(u32),
    /// User-data key not present.
    KeyMissing(u32),
    /// Swap of two objects with different sizes.
    SizeMismatch { a: u64, b: u64 },
    /// Swap of two objects owned by different managers.
    ManagerMismatch,
    /// A named-semaphore primitive failed.
    Semaphore { op: &'static str, errno: i32 },
    /// The backing store (kernel driver) rejected the operation.
    Backing(drm_core::DrmError),
}

impl fmt::Display for BufMgrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBackend => write!(f, "no usable buffer backend"),
            Self::BackendInit { name } => write!(f, "backend {} failed to initialize", name),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Self::KeyExists(key) => write!(f, "user-data key {} already exists", key),
            Self::KeyMissing(key) => write!(f, "user-data key {} not found", key),
            Self::SizeMismatch { a, b } => write!(f, "swap size mismatch: {} vs {}", a, b),
            Self::ManagerMismatch => write!(f, "objects belong to different managers"),
            Self::Semaphore { op, errno } => write!(f, "sem_{}: errno {}", op, errno),
            Self::Backing(e) => write!(f, "backing store: {}", e),
        }
    }
}

impl std::error::Error for BufMgrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<drm_core::DrmError> for BufMgrError {
    fn from(e: drm_core::DrmError) -> Self {
        Self::Backing(e)
    }
}

pub type Result<T> = std::result::Result<T, BufMgrError>;
