//! In-process heap backend.
//!
//! Backing store is plain heap memory, so the manager can be exercised
//! without display hardware. Export hands out keys in a process-global
//! table; import and attach resolve against it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::backend::{BackendBuffer, BufferBackend};
use crate::error::{BufMgrError, Result};

type Storage = Arc<Mutex<Vec<u8>>>;

static EXPORTS: OnceLock<Mutex<HashMap<u64, Storage>>> = OnceLock::new();
static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

fn exports() -> &'static Mutex<HashMap<u64, Storage>> {
    EXPORTS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn table_guard() -> std::sync::MutexGuard<'static, HashMap<u64, Storage>> {
    exports().lock().unwrap_or_else(|e| e.into_inner())
}

pub fn new() -> Result<Box<dyn BufferBackend>> {
    Ok(Box::new(HeapBackend))
}

struct HeapBackend;

struct HeapBuffer {
    storage: Storage,
    size: u64,
    key: Option<u64>,
}

impl HeapBuffer {
    fn over(storage: Storage, key: Option<u64>) -> Self {
        let size = storage.lock().unwrap_or_else(|e| e.into_inner()).len() as u64;
        Self { storage, size, key }
    }
}

impl BufferBackend for HeapBackend {
    fn name(&self) -> &'static str {
        "heap"
    }

    fn alloc(&self, size: u64, _flags: u32) -> Result<Box<dyn BackendBuffer>> {
        let storage = Arc::new(Mutex::new(vec![0u8; size as usize]));
        Ok(Box::new(HeapBuffer {
            storage,
            size,
            key: None,
        }))
    }

    fn attach(&self, key: u64, size: u64) -> Result<Box<dyn BackendBuffer>> {
        let buf = self.import(key)?;
        if buf.size() != size {
            return Err(BufMgrError::SizeMismatch {
                a: buf.size(),
                b: size,
            });
        }
        Ok(buf)
    }

    fn import(&self, key: u64) -> Result<Box<dyn BackendBuffer>> {
        let storage = table_guard()
            .get(&key)
            .cloned()
            .ok_or(BufMgrError::InvalidArgument("unknown export key"))?;
        Ok(Box::new(HeapBuffer::over(storage, Some(key))))
    }
}

impl BackendBuffer for HeapBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn export(&mut self) -> Result<u64> {
        if let Some(key) = self.key {
            return Ok(key);
        }
        let key = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
        table_guard().insert(key, Arc::clone(&self.storage));
        self.key = Some(key);
        Ok(key)
    }

    fn map(&mut self, _device: u32, _opt: u32) -> Result<*mut u8> {
        // The vec is never resized, so the pointer stays valid for the
        // storage's lifetime.
        Ok(self
            .storage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_mut_ptr())
    }

    fn unmap(&mut self, _device: u32) -> Result<()> {
        Ok(())
    }

    fn cache_flush(&mut self, _flags: u32) -> Result<()> {
        // Heap memory is CPU coherent.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_map() {
        let backend = new().unwrap();
        let mut buf = backend.alloc(4096, 0).unwrap();
        assert_eq!(buf.size(), 4096);
        let ptr = buf.map(crate::backend::DEVICE_CPU, crate::backend::OPT_WRITE).unwrap();
        unsafe {
            *ptr = 0xAB;
        }
        assert_eq!(buf.map(0, 0).unwrap(), ptr);
    }

    #[test]
    fn test_export_import_shares_storage() {
        let backend = new().unwrap();
        let mut a = backend.alloc(64, 0).unwrap();
        let key = a.export().unwrap();
        assert_eq!(a.export().unwrap(), key);

        let mut b = backend.import(key).unwrap();
        assert_eq!(b.size(), 64);
        unsafe {
            *a.map(0, 0).unwrap() = 7;
        }
        assert_eq!(unsafe { *b.map(0, 0).unwrap() }, 7);
    }

    #[test]
    fn test_attach_checks_size() {
        let backend = new().unwrap();
        let mut a = backend.alloc(128, 0).unwrap();
        let key = a.export().unwrap();
        assert!(backend.attach(key, 128).is_ok());
        assert!(matches!(
            backend.attach(key, 256),
            Err(BufMgrError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_import_unknown_key_fails() {
        let backend = new().unwrap();
        assert!(backend.import(u64::MAX).is_err());
    }
}
