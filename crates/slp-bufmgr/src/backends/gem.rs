//! GEM backend over the Exynos DRM device.
//!
//! Allocations are vendor GEM objects, CPU mappings go through the
//! fake-offset path, export keys are flink names, and cache flushes
//! run the vendor cache op over the mapped range.

use drm_core::{gem as core_gem, Device};
use drm_exynos::{gem, sys as exynos_sys};

use std::sync::Arc;

use crate::backend::{BackendBuffer, BufferBackend, CACHE_ALL};
use crate::error::{BufMgrError, Result};

pub fn new() -> Result<Box<dyn BufferBackend>> {
    let dev = drm_exynos::open_device().map_err(|_| BufMgrError::BackendInit {
        name: "gem".to_string(),
    })?;
    Ok(Box::new(GemBackend { dev: Arc::new(dev) }))
}

struct GemBackend {
    dev: Arc<Device>,
}

struct GemBuffer {
    dev: Arc<Device>,
    handle: u32,
    size: u64,
    name: Option<u64>,
    mapping: Option<gem::Mapping>,
}

impl BufferBackend for GemBackend {
    fn name(&self) -> &'static str {
        "gem"
    }

    fn alloc(&self, size: u64, flags: u32) -> Result<Box<dyn BackendBuffer>> {
        let handle = gem::create(&self.dev, size, flags)?;
        Ok(Box::new(GemBuffer {
            dev: Arc::clone(&self.dev),
            handle,
            size,
            name: None,
            mapping: None,
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
        let (handle, size) = core_gem::gem_open(&self.dev, key as u32)?;
        Ok(Box::new(GemBuffer {
            dev: Arc::clone(&self.dev),
            handle,
            size,
            name: Some(key),
            mapping: None,
        }))
    }
}

impl BackendBuffer for GemBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn export(&mut self) -> Result<u64> {
        if let Some(name) = self.name {
            return Ok(name);
        }
        let name = core_gem::gem_flink(&self.dev, self.handle)? as u64;
        self.name = Some(name);
        Ok(name)
    }

    fn map(&mut self, _device: u32, _opt: u32) -> Result<*mut u8> {
        if self.mapping.is_none() {
            self.mapping = Some(gem::map(&self.dev, self.handle, self.size)?);
        }
        match &self.mapping {
            Some(m) => Ok(m.as_ptr()),
            None => Err(BufMgrError::InvalidArgument("mapping lost")),
        }
    }

    fn unmap(&mut self, _device: u32) -> Result<()> {
        self.mapping = None;
        Ok(())
    }

    fn cache_flush(&mut self, flags: u32) -> Result<()> {
        let mapping = match &self.mapping {
            Some(m) => m,
            None => return Err(BufMgrError::InvalidArgument("cache flush of unmapped bo")),
        };
        // Our flush bits match the vendor's op bits; add the cache
        // unit selector.
        let op = (flags & CACHE_ALL) | exynos_sys::EXYNOS_DRM_ALL_CACHE;
        gem::cache_op(&self.dev, mapping.as_ptr() as u64, self.size as u32, op)?;
        Ok(())
    }
}

impl Drop for GemBuffer {
    fn drop(&mut self) {
        self.mapping = None;
        let _ = core_gem::gem_close(&self.dev, self.handle);
    }
}
