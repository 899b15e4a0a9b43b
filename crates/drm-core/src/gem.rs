//! GEM buffer sharing: global names (flink/open) and PRIME dmabuf fds.

use crate::device::Device;
use crate::error::{ioctl_err, Result};
use crate::sys;

/// Drop the handle's reference in this fd's handle table.
pub fn gem_close(dev: &Device, handle: u32) -> Result<()> {
    let arg = sys::DrmGemClose {
        handle,
        pad: 0,
    };
    unsafe { sys::drm_ioctl_gem_close(dev.fd(), &arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_GEM_CLOSE", e))?;
    Ok(())
}

/// Export a handle as a global name another process can open.
pub fn gem_flink(dev: &Device, handle: u32) -> Result<u32> {
    let mut arg = sys::DrmGemFlink::zeroed();
    arg.handle = handle;
    unsafe { sys::drm_ioctl_gem_flink(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_GEM_FLINK", e))?;
    Ok(arg.name)
}

/// Open a global name; returns (handle, size).
pub fn gem_open(dev: &Device, name: u32) -> Result<(u32, u64)> {
    let mut arg = sys::DrmGemOpen::zeroed();
    arg.name = name;
    unsafe { sys::drm_ioctl_gem_open(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_GEM_OPEN", e))?;
    Ok((arg.handle, arg.size))
}

/// Export a handle as a dmabuf file descriptor (close-on-exec).
pub fn prime_handle_to_fd(dev: &Device, handle: u32) -> Result<i32> {
    let mut arg = sys::DrmPrimeHandle::zeroed();
    arg.handle = handle;
    arg.flags = sys::DRM_CLOEXEC;
    unsafe { sys::drm_ioctl_prime_handle_to_fd(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_PRIME_HANDLE_TO_FD", e))?;
    Ok(arg.fd)
}

/// Import a dmabuf file descriptor as a GEM handle.
pub fn prime_fd_to_handle(dev: &Device, fd: i32) -> Result<u32> {
    let mut arg = sys::DrmPrimeHandle::zeroed();
    arg.fd = fd;
    unsafe { sys::drm_ioctl_prime_fd_to_handle(dev.fd(), &mut arg) }
        .map_err(|e| ioctl_err("DRM_IOCTL_PRIME_FD_TO_HANDLE", e))?;
    Ok(arg.handle)
}
