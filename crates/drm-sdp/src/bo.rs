//! SDP buffer-object lifecycle.
//!
//! A `SdpBo` owns one GEM handle on an open device and, optionally, a
//! CPU mapping. Dropping the object unmaps and closes the handle. The
//! global name from flink is cached after the first query, as is the
//! name recorded when the object was opened by name.

use drm_core::error::{ioctl_err, DrmError, Result};
use drm_core::{ddebug, gem, mode, Device};

use std::cell::Cell;

use crate::sys;

pub struct SdpBo<'d> {
    dev: &'d Device,
    handle: u32,
    size: u64,
    flags: u32,
    /// Row pitch in bytes; only set on the dumb-buffer path.
    pitch: u32,
    name: Cell<u32>,
    map_ptr: *mut u8,
    map_len: usize,
}

impl<'d> SdpBo<'d> {
    /// Allocate through the vendor GEM ioctl. `flags` carries the
    /// `SDP_DRM_GEM_*` memory type.
    pub fn create(dev: &'d Device, size: u64, flags: u32) -> Result<Self> {
        if size == 0 {
            return Err(DrmError::InvalidArgument("bo size 0"));
        }
        let mut arg = sys::SdpGemCreate::zeroed();
        arg.size = size;
        arg.flags = flags;
        unsafe { sys::sdp_ioctl_gem_create(dev.fd(), &mut arg) }
            .map_err(|e| ioctl_err("DRM_SDP_GEM_CREATE", e))?;
        ddebug!("sdp bo created: handle {} size {}", arg.handle, size);
        Ok(Self {
            dev,
            handle: arg.handle,
            size,
            flags,
            pitch: 0,
            name: Cell::new(0),
            map_ptr: std::ptr::null_mut(),
            map_len: 0,
        })
    }

    /// Allocate a scanout buffer via the dumb-buffer ioctl at 32 bpp.
    pub fn create_dumb(dev: &'d Device, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DrmError::InvalidArgument("dumb bo with zero dimension"));
        }
        let dumb = mode::create_dumb(dev, width, height, 32)?;
        Ok(Self {
            dev,
            handle: dumb.handle,
            size: dumb.size,
            flags: 0,
            pitch: dumb.pitch,
            name: Cell::new(0),
            map_ptr: std::ptr::null_mut(),
            map_len: 0,
        })
    }

    /// Open another process's buffer by its flink name.
    pub fn from_name(dev: &'d Device, name: u32) -> Result<Self> {
        let (handle, size) = gem::gem_open(dev, name)?;
        Ok(Self {
            dev,
            handle,
            size,
            flags: 0,
            pitch: 0,
            name: Cell::new(name),
            map_ptr: std::ptr::null_mut(),
            map_len: 0,
        })
    }

    /// Import a PRIME dmabuf fd.
    pub fn from_prime_fd(dev: &'d Device, fd: i32) -> Result<Self> {
        let handle = gem::prime_fd_to_handle(dev, fd)?;
        Ok(Self {
            dev,
            handle,
            size: 0,
            flags: 0,
            pitch: 0,
            name: Cell::new(0),
            map_ptr: std::ptr::null_mut(),
            map_len: 0,
        })
    }

    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Flink name, fetched once and cached.
    pub fn name(&self) -> Result<u32> {
        if self.name.get() != 0 {
            return Ok(self.name.get());
        }
        let name = gem::gem_flink(self.dev, self.handle)?;
        self.name.set(name);
        Ok(name)
    }

    /// Export as a PRIME dmabuf fd (close-on-exec).
    pub fn export_prime(&self) -> Result<i32> {
        gem::prime_handle_to_fd(self.dev, self.handle)
    }

    /// Map read/write through the dumb-buffer fake offset. Idempotent;
    /// the mapping lives until the object is dropped.
    pub fn map(&mut self) -> Result<*mut u8> {
        if !self.map_ptr.is_null() {
            return Ok(self.map_ptr);
        }
        let offset = mode::map_dumb(self.dev, self.handle)?;
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                self.size as libc::size_t,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                self.dev.fd(),
                offset as libc::off_t,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(DrmError::MmapFailed(drm_core::last_errno()));
        }
        self.map_ptr = ptr as *mut u8;
        self.map_len = self.size as usize;
        Ok(self.map_ptr)
    }

    pub fn mapped(&mut self) -> Option<&mut [u8]> {
        if self.map_ptr.is_null() {
            return None;
        }
        Some(unsafe { std::slice::from_raw_parts_mut(self.map_ptr, self.map_len) })
    }

    /// Drop the CPU mapping early.
    pub fn unmap(&mut self) {
        if !self.map_ptr.is_null() {
            unsafe {
                libc::munmap(self.map_ptr as *mut libc::c_void, self.map_len);
            }
            self.map_ptr = std::ptr::null_mut();
            self.map_len = 0;
        }
    }
}

impl Drop for SdpBo<'_> {
    fn drop(&mut self) {
        self.unmap();
        if self.handle != 0 {
            let _ = gem::gem_close(self.dev, self.handle);
            self.handle = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_zero_size() {
        let dev = Device::open("/dev/null").unwrap();
        assert!(matches!(
            SdpBo::create(&dev, 0, sys::SDP_DRM_GEM_CONTIG),
            Err(DrmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_create_dumb_rejects_zero_dimension() {
        let dev = Device::open("/dev/null").unwrap();
        assert!(matches!(
            SdpBo::create_dumb(&dev, 0, 1080),
            Err(DrmError::InvalidArgument(_))
        ));
    }
}
