//! Shared buffer-object handle.
//!
//! Cloning a `Bo` takes a reference; dropping the last clone releases
//! the backing store exactly once and drains the user-data table,
//! running each value's drop as its destructor. All operations take
//! the owning manager's lock for the duration of the call.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::backend::BackendBuffer;
use crate::error::{BufMgrError, Result};
use crate::mgr::{guard, MgrInner};

struct BoInner {
    // Declared before the payload so destructors run while the backing
    // store is still alive.
    user_data: Mutex<BTreeMap<u32, Box<dyn Any>>>,
    payload: Mutex<Box<dyn BackendBuffer>>,
}

#[derive(Clone)]
pub struct Bo {
    mgr: Arc<MgrInner>,
    inner: Arc<BoInner>,
}

impl Bo {
    pub(crate) fn new(mgr: Arc<MgrInner>, payload: Box<dyn BackendBuffer>) -> Self {
        Self {
            mgr,
            inner: Arc::new(BoInner {
                user_data: Mutex::new(BTreeMap::new()),
                payload: Mutex::new(payload),
            }),
        }
    }

    /// Number of live handles to this object.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn size(&self) -> Result<u64> {
        let _g = guard(&self.mgr.lock);
        Ok(guard(&self.inner.payload).size())
    }

    /// Global key another process can import.
    pub fn export(&self) -> Result<u64> {
        let _g = guard(&self.mgr.lock);
        guard(&self.inner.payload).export()
    }

    /// Map for `device` access with `OPT_*` intents.
    pub fn map(&self, device: u32, opt: u32) -> Result<*mut u8> {
        let _g = guard(&self.mgr.lock);
        guard(&self.inner.payload).map(device, opt)
    }

    pub fn unmap(&self, device: u32) -> Result<()> {
        let _g = guard(&self.mgr.lock);
        guard(&self.inner.payload).unmap(device)
    }

    pub fn cache_flush(&self, flags: u32) -> Result<()> {
        let _g = guard(&self.mgr.lock);
        guard(&self.inner.payload).cache_flush(flags)
    }

    /// Exchange the backing stores of two objects. Both must belong to
    /// the same manager and report equal size.
    pub fn swap(a: &Bo, b: &Bo) -> Result<()> {
        if !Arc::ptr_eq(&a.mgr, &b.mgr) {
            return Err(BufMgrError::ManagerMismatch);
        }
        if Arc::ptr_eq(&a.inner, &b.inner) {
            return Ok(());
        }
        let _g = guard(&a.mgr.lock);
        let mut pa = guard(&a.inner.payload);
        let mut pb = guard(&b.inner.payload);
        if pa.size() != pb.size() {
            return Err(BufMgrError::SizeMismatch {
                a: pa.size(),
                b: pb.size(),
            });
        }
        std::mem::swap(&mut *pa, &mut *pb);
        Ok(())
    }

    // ── User-data side table ──

    /// Install a value under `key`. Fails if the key exists; the
    /// existing entry is untouched and its destructor does not run.
    pub fn add_user_data(&self, key: u32, value: Box<dyn Any>) -> Result<()> {
        let _g = guard(&self.mgr.lock);
        let mut table = guard(&self.inner.user_data);
        if table.contains_key(&key) {
            return Err(BufMgrError::KeyExists(key));
        }
        table.insert(key, value);
        Ok(())
    }

    /// Replace the value under an existing `key`, dropping the prior
    /// value. Fails when the key is missing.
    pub fn set_user_data(&self, key: u32, value: Box<dyn Any>) -> Result<()> {
        let _g = guard(&self.mgr.lock);
        let mut table = guard(&self.inner.user_data);
        match table.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BufMgrError::KeyMissing(key)),
        }
    }

    /// Look at the value under `key` without removing it.
    pub fn with_user_data<R>(&self, key: u32, f: impl FnOnce(&dyn Any) -> R) -> Result<R> {
        let _g = guard(&self.mgr.lock);
        let table = guard(&self.inner.user_data);
        match table.get(&key) {
            Some(value) => Ok(f(value.as_ref())),
            None => Err(BufMgrError::KeyMissing(key)),
        }
    }

    /// Remove and drop the value under `key`.
    pub fn delete_user_data(&self, key: u32) -> Result<()> {
        let _g = guard(&self.mgr.lock);
        let mut table = guard(&self.inner.user_data);
        match table.remove(&key) {
            Some(_) => Ok(()),
            None => Err(BufMgrError::KeyMissing(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends;
    use crate::mgr::BufMgr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn heap_mgr(tag: &str) -> BufMgr {
        let name = format!("slp-bo-test-{}-{}", tag, std::process::id());
        BufMgr::with_backend(backends::heap::new().unwrap(), &name).unwrap()
    }

    /// Counts drops, standing in for a user-data destructor and for
    /// backend frees.
    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_reference_lifecycle() {
        let mgr = heap_mgr("refs");
        let bo = mgr.alloc(4096, 0).unwrap();
        assert_eq!(bo.ref_count(), 1);

        let second = bo.clone();
        assert_eq!(bo.ref_count(), 2);

        drop(second);
        assert_eq!(bo.ref_count(), 1);
        // Still usable after dropping one handle.
        assert_eq!(bo.size().unwrap(), 4096);
    }

    #[test]
    fn test_user_data_destructor_runs_once_at_teardown() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mgr = heap_mgr("dtor");
        let bo = mgr.alloc(64, 0).unwrap();
        bo.add_user_data(1, Box::new(DropCounter(Arc::clone(&drops))))
            .unwrap();
        bo.add_user_data(2, Box::new(DropCounter(Arc::clone(&drops))))
            .unwrap();

        let second = bo.clone();
        drop(bo);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(second);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_existing_key_fails_without_dropping() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mgr = heap_mgr("add");
        let bo = mgr.alloc(64, 0).unwrap();
        bo.add_user_data(7, Box::new(DropCounter(Arc::clone(&drops))))
            .unwrap();

        let err = bo.add_user_data(7, Box::new(DropCounter(Arc::clone(&drops))));
        assert!(matches!(err, Err(BufMgrError::KeyExists(7))));
        // The rejected value is dropped, the stored one is not.
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        bo.with_user_data(7, |v| assert!(v.is::<DropCounter>()))
            .unwrap();
    }

    #[test]
    fn test_set_replaces_and_drops_prior() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mgr = heap_mgr("set");
        let bo = mgr.alloc(64, 0).unwrap();

        assert!(matches!(
            bo.set_user_data(3, Box::new(0u32)),
            Err(BufMgrError::KeyMissing(3))
        ));

        bo.add_user_data(3, Box::new(DropCounter(Arc::clone(&drops))))
            .unwrap();
        bo.set_user_data(3, Box::new(41u32)).unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        let value = bo
            .with_user_data(3, |v| *v.downcast_ref::<u32>().unwrap())
            .unwrap();
        assert_eq!(value, 41);
    }

    #[test]
    fn test_delete_drops_value() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mgr = heap_mgr("del");
        let bo = mgr.alloc(64, 0).unwrap();
        bo.add_user_data(9, Box::new(DropCounter(Arc::clone(&drops))))
            .unwrap();
        bo.delete_user_data(9).unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(matches!(
            bo.delete_user_data(9),
            Err(BufMgrError::KeyMissing(9))
        ));
    }

    #[test]
    fn test_swap_requires_same_manager_and_size() {
        let mgr = heap_mgr("swap");
        let other_mgr = heap_mgr("swap2");

        let a = mgr.alloc(128, 0).unwrap();
        let b = mgr.alloc(128, 0).unwrap();
        let c = mgr.alloc(256, 0).unwrap();
        let d = other_mgr.alloc(128, 0).unwrap();

        assert!(matches!(
            Bo::swap(&a, &d),
            Err(BufMgrError::ManagerMismatch)
        ));
        assert!(matches!(
            Bo::swap(&a, &c),
            Err(BufMgrError::SizeMismatch { .. })
        ));

        unsafe {
            *a.map(0, 0).unwrap() = 1;
            *b.map(0, 0).unwrap() = 2;
        }
        Bo::swap(&a, &b).unwrap();
        unsafe {
            assert_eq!(*a.map(0, 0).unwrap(), 2);
            assert_eq!(*b.map(0, 0).unwrap(), 1);
        }
    }

    #[test]
    fn test_swap_with_self_is_noop() {
        let mgr = heap_mgr("selfswap");
        let a = mgr.alloc(32, 0).unwrap();
        let alias = a.clone();
        Bo::swap(&a, &alias).unwrap();
        assert_eq!(a.size().unwrap(), 32);
    }
}
