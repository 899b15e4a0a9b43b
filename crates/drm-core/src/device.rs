//! DRM device node handling.
//!
//! `Device` owns the file descriptor for a `/dev/dri/cardN` node and
//! closes it on drop. `Device::open_by_name` is the `drmOpen` equivalent:
//! it scans the card nodes and matches the driver name reported by
//! `DRM_IOCTL_VERSION`.

use crate::error::{ioctl_err, DrmError, Result};
use crate::sys;
use crate::{ddebug, dinfo};

use std::os::unix::io::RawFd;

/// Highest card minor probed by `open_by_name`.
const MAX_CARD_NODES: u32 = 16;

pub struct Device {
    fd: RawFd,
    path: String,
}

/// Owned result of a `DRM_IOCTL_VERSION` query.
#[derive(Debug, Clone)]
pub struct DriverVersion {
    pub major: i32,
    pub minor: i32,
    pub patchlevel: i32,
    pub name: String,
    pub date: String,
    pub desc: String,
}

impl Device {
    /// Open a DRM device node read/write with close-on-exec.
    pub fn open(path: &str) -> Result<Self> {
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::IntoRawFd;

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_CLOEXEC)
            .open(path)
            .map_err(|e| DrmError::Open {
                path: path.to_string(),
                errno: e.raw_os_error().unwrap_or(0),
            })?;

        Ok(Self {
            fd: file.into_raw_fd(),
            path: path.to_string(),
        })
    }

    /// Open the device whose kernel driver reports `name`.
    ///
    /// Scans `/dev/dri/card0..card15`; nodes that fail to open or answer
    /// the version query are skipped.
    pub fn open_by_name(name: &str) -> Result<Self> {
        for minor in 0..MAX_CARD_NODES {
            let path = format!("/dev/dri/card{}", minor);
            let dev = match Self::open(&path) {
                Ok(dev) => dev,
                Err(_) => continue,
            };
            match dev.version() {
                Ok(ver) if ver.name == name => {
                    dinfo!("found DRM device {} at {}", name, path);
                    return Ok(dev);
                }
                Ok(ver) => ddebug!("{} is {}, not {}", path, ver.name, name),
                Err(_) => {}
            }
        }
        Err(DrmError::DeviceNotFound(name.to_string()))
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Driver name/date/description and version numbers.
    ///
    /// Two-call protocol: first query the string lengths, then fetch the
    /// strings into caller-allocated buffers.
    pub fn version(&self) -> Result<DriverVersion> {
        let mut ver = sys::DrmVersion::zeroed();
        unsafe { sys::drm_ioctl_version(self.fd, &mut ver) }
            .map_err(|e| ioctl_err("DRM_IOCTL_VERSION", e))?;

        let mut name = vec![0u8; ver.name_len];
        let mut date = vec![0u8; ver.date_len];
        let mut desc = vec![0u8; ver.desc_len];
        ver.name = name.as_mut_ptr() as *mut _;
        ver.date = date.as_mut_ptr() as *mut _;
        ver.desc = desc.as_mut_ptr() as *mut _;

        unsafe { sys::drm_ioctl_version(self.fd, &mut ver) }
            .map_err(|e| ioctl_err("DRM_IOCTL_VERSION", e))?;

        name.truncate(ver.name_len);
        date.truncate(ver.date_len);
        desc.truncate(ver.desc_len);

        Ok(DriverVersion {
            major: ver.version_major,
            minor: ver.version_minor,
            patchlevel: ver.version_patchlevel,
            name: String::from_utf8_lossy(&name).into_owned(),
            date: String::from_utf8_lossy(&date).into_owned(),
            desc: String::from_utf8_lossy(&desc).into_owned(),
        })
    }
}

impl std::os::unix::io::AsRawFd for Device {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if self.fd >= 0 {
            unsafe {
                libc::close(self.fd);
            }
            self.fd = -1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_node() {
        let err = Device::open("/dev/dri/card-does-not-exist");
        assert!(matches!(err, Err(DrmError::Open { .. })));
    }

    #[test]
    fn test_open_by_name_unknown_driver() {
        let err = Device::open_by_name("__no_such_driver__");
        assert!(matches!(err, Err(DrmError::DeviceNotFound(_))));
    }
}
