//! The buffer manager.
//!
//! Owns the selected backend, the in-process lock guarding all
//! buffer-object bookkeeping, and the lazily opened named semaphore for
//! cross-process coordination.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::BufferBackend;
use crate::bo::Bo;
use crate::error::{BufMgrError, Result};
use crate::registry;
use crate::semaphore::{NamedSemaphore, DEFAULT_SEM_NAME};

pub(crate) fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) struct MgrInner {
    pub(crate) backend: Box<dyn BufferBackend>,
    /// Guards all buffer-object bookkeeping across this manager.
    pub(crate) lock: Mutex<()>,
    sem: Mutex<NamedSemaphore>,
}

#[derive(Clone)]
pub struct BufMgr {
    inner: Arc<MgrInner>,
}

impl BufMgr {
    /// Create a manager with the backend chosen by the selection order
    /// (environment variable, default, registry scan).
    pub fn new() -> Result<Self> {
        Self::with_backend(registry::select_backend()?, DEFAULT_SEM_NAME)
    }

    /// Create a manager over an explicitly chosen backend.
    pub fn with_backend(backend: Box<dyn BufferBackend>, sem_name: &str) -> Result<Self> {
        let sem = NamedSemaphore::new(sem_name)?;
        Ok(Self {
            inner: Arc::new(MgrInner {
                backend,
                lock: Mutex::new(()),
                sem: Mutex::new(sem),
            }),
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }

    /// Allocate a new buffer object. Flags pass through to the backend.
    pub fn alloc(&self, size: u64, flags: u32) -> Result<Bo> {
        if size == 0 {
            return Err(BufMgrError::InvalidArgument("alloc size 0"));
        }
        let _g = guard(&self.inner.lock);
        let payload = self.inner.backend.alloc(size, flags)?;
        Ok(Bo::new(Arc::clone(&self.inner), payload))
    }

    /// Wrap existing backing storage under a known key and size.
    pub fn attach(&self, key: u64, size: u64) -> Result<Bo> {
        if size == 0 {
            return Err(BufMgrError::InvalidArgument("attach size 0"));
        }
        let _g = guard(&self.inner.lock);
        let payload = self.inner.backend.attach(key, size)?;
        Ok(Bo::new(Arc::clone(&self.inner), payload))
    }

    /// Import a buffer exported by another process.
    pub fn import(&self, key: u64) -> Result<Bo> {
        let _g = guard(&self.inner.lock);
        let payload = self.inner.backend.import(key)?;
        Ok(Bo::new(Arc::clone(&self.inner), payload))
    }

    /// Take the cross-process lock. Returns false as an idempotent
    /// no-op when this manager already holds it.
    pub fn lock(&self) -> Result<bool> {
        guard(&self.inner.sem).lock()
    }

    /// Release the cross-process lock, reporting the real result of
    /// the underlying post. Returns false as a no-op when not held.
    pub fn unlock(&self) -> Result<bool> {
        guard(&self.inner.sem).unlock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends;

    fn heap_mgr(tag: &str) -> BufMgr {
        let name = format!("slp-mgr-test-{}-{}", tag, std::process::id());
        BufMgr::with_backend(backends::heap::new().unwrap(), &name).unwrap()
    }

    #[test]
    fn test_alloc_rejects_zero_size() {
        let mgr = heap_mgr("zero");
        assert!(matches!(
            mgr.alloc(0, 0),
            Err(BufMgrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_requested_backend_selection() {
        let backend = registry::select_backend_from(Some("heap")).unwrap();
        let name = format!("slp-mgr-test-sel-{}", std::process::id());
        let mgr = BufMgr::with_backend(backend, &name).unwrap();
        assert_eq!(mgr.backend_name(), "heap");
    }

    #[test]
    fn test_cross_process_lock_idempotence() {
        let mgr = heap_mgr("lock");
        assert!(mgr.lock().unwrap());
        assert!(!mgr.lock().unwrap());
        assert!(mgr.unlock().unwrap());
        assert!(!mgr.unlock().unwrap());
    }

    #[test]
    fn test_import_export_round_trip() {
        let mgr = heap_mgr("imp");
        let bo = mgr.alloc(256, 0).unwrap();
        let key = bo.export().unwrap();
        let other = mgr.import(key).unwrap();
        assert_eq!(other.size().unwrap(), 256);
    }
}
