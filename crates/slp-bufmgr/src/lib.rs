//! # slp-bufmgr
//!
//! Pluggable buffer manager: one backend strategy selected at startup
//! (environment variable, default, registry scan), a lock-guarded
//! shared buffer-object handle with a user-data side table, and a
//! named-semaphore cross-process advisory lock.
//!
//! ## Modules
//!
//! - `backend`   - the backend capability traits and map/cache flags
//! - `backends`  - provided backends (Exynos GEM, in-process heap)
//! - `registry`  - constructor list and selection order
//! - `mgr`       - the manager
//! - `bo`        - the shared buffer-object handle
//! - `semaphore` - named POSIX semaphore state machine
//! - `error`     - error types

#![allow(dead_code)]

pub mod backend;
pub mod backends;
pub mod bo;
pub mod error;
pub mod mgr;
pub mod registry;
pub mod semaphore;

pub use backend::{BackendBuffer, BufferBackend};
pub use bo::Bo;
pub use error::{BufMgrError, Result};
pub use mgr::BufMgr;
pub use semaphore::{NamedSemaphore, SemState, DEFAULT_SEM_NAME};
