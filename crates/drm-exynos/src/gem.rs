//! Exynos GEM: allocation, CPU mapping, cache maintenance and the
//! vendor import/export paths (userptr, UMP, physical address).

use drm_core::error::{ioctl_err, DrmError, Result};
use drm_core::Device;

use crate::sys;

/// Allocate a buffer object. `flags` combines the `EXYNOS_BO_*` memory
/// type bits. Returns the GEM handle.
pub fn create(dev: &Device, size: u64, flags: u32) -> Result<u32> {
    if size == 0 {
        return Err(DrmError::InvalidArgument("gem size 0"));
    }
    let mut arg = sys::ExynosGemCreate::zeroed();
    arg.size = size;
    arg.flags = flags;
    unsafe { sys::exynos_ioctl_gem_create(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_CREATE", e))?;
    Ok(arg.handle)
}

/// Fake mmap offset for mapping `handle` through the device fd.
pub fn map_offset(dev: &Device, handle: u32) -> Result<u64> {
    let mut arg = sys::ExynosGemMapOff::zeroed();
    arg.handle = handle;
    unsafe { sys::exynos_ioctl_gem_map_offset(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_MAP_OFFSET", e))?;
    Ok(arg.offset)
}

/// CPU mapping of a buffer object, unmapped on drop.
#[derive(Debug)]
pub struct Mapping {
    ptr: *mut u8,
    len: usize,
}

impl Mapping {
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr as *mut libc::c_void, self.len);
        }
    }
}

/// Map `handle` read/write via the fake-offset path (MAP_OFFSET then
/// mmap on the device fd).
pub fn map(dev: &Device, handle: u32, size: u64) -> Result<Mapping> {
    let offset = map_offset(dev, handle)?;
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            size as libc::size_t,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            dev.fd(),
            offset as libc::off_t,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(DrmError::MmapFailed(drm_core::last_errno()));
    }
    Ok(Mapping {
        ptr: ptr as *mut u8,
        len: size as usize,
    })
}

/// Map `handle` via the vendor in-kernel mmap ioctl. Older driver path;
/// the kernel performs the mmap and returns the user address.
pub fn map_direct(dev: &Device, handle: u32, size: u64) -> Result<Mapping> {
    let mut arg = sys::ExynosGemMmap::zeroed();
    arg.handle = handle;
    arg.size = size;
    unsafe { sys::exynos_ioctl_gem_mmap(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_MMAP", e))?;
    Ok(Mapping {
        ptr: arg.mapped as *mut u8,
        len: size as usize,
    })
}

/// Wrap anonymous user memory as a GEM object. The pages are locked by
/// the kernel for the handle's lifetime.
pub fn import_userptr(dev: &Device, user_ptr: u64, size: u32) -> Result<u32> {
    let mut arg = sys::ExynosGemUserptrImp::zeroed();
    arg.user_ptr = user_ptr;
    arg.size = size;
    unsafe { sys::exynos_ioctl_gem_userptr_imp(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_USERPTR_IMP", e))?;
    Ok(arg.handle)
}

/// Flush, clean or invalidate the CPU cache over a mapped range.
/// `flags` combines one cache unit with one `EXYNOS_DRM_CACHE_*` op.
pub fn cache_op(dev: &Device, usr_addr: u64, size: u32, flags: u32) -> Result<()> {
    let mut arg = sys::ExynosGemCacheOp::zeroed();
    arg.usr_addr = usr_addr;
    arg.size = size;
    arg.flags = flags;
    unsafe { sys::exynos_ioctl_gem_cache_op(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_CACHE_OP", e))?;
    Ok(())
}

/// Export a handle as a UMP secure id.
pub fn export_ump(dev: &Device, handle: u32) -> Result<u32> {
    let mut arg = sys::ExynosGemUmp::zeroed();
    arg.gem_handle = handle;
    unsafe { sys::exynos_ioctl_gem_export_ump(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_EXPORT_UMP", e))?;
    Ok(arg.secure_id)
}

/// Physical address and size backing a contiguous buffer object.
pub fn get_phy(dev: &Device, handle: u32) -> Result<(u64, u64)> {
    let mut arg = sys::ExynosGemGetPhy::zeroed();
    arg.gem_handle = handle;
    unsafe { sys::exynos_ioctl_gem_get_phy(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_GET_PHY", e))?;
    Ok((arg.phy_addr, arg.size))
}

/// Wrap a raw physical range as a GEM object. Returns the handle.
pub fn import_phy(dev: &Device, phy_addr: u64, size: u64) -> Result<u32> {
    let mut arg = sys::ExynosGemPhyImp::zeroed();
    arg.phy_addr = phy_addr;
    arg.size = size;
    unsafe { sys::exynos_ioctl_gem_phy_imp(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_GEM_PHY_IMP", e))?;
    Ok(arg.gem_handle)
}

/// Move a plane within the overlay stack.
pub fn plane_set_zpos(dev: &Device, plane_id: u32, zpos: i32) -> Result<()> {
    let mut arg = sys::ExynosPlaneSetZpos::zeroed();
    arg.plane_id = plane_id;
    arg.zpos = zpos;
    unsafe { sys::exynos_ioctl_plane_set_zpos(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_EXYNOS_PLANE_SET_ZPOS", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_zero_size() {
        // The size check fires before the ioctl, so any open fd will do.
        let dev = drm_core::Device::open("/dev/null").unwrap();
        match create(&dev, 0, sys::EXYNOS_BO_CONTIG) {
            Err(DrmError::InvalidArgument(_)) => {}
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
