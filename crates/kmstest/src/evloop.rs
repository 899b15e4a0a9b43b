//! Poll loop shared by the interactive demos: wait on the DRM fd and
//! stdin at once, so a keypress ends the demo.

use drm_core::{DrmError, Result};
use nix::poll::{poll, PollFd, PollFlags};
use std::os::fd::BorrowedFd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The DRM fd has an event to read.
    Device,
    /// Standard input became readable.
    Stdin,
    Timeout,
}

/// Block until the device fd or stdin is readable, or `timeout_ms`
/// elapses. Device readiness wins when both are ready.
pub fn wait_device_or_stdin(dev_fd: i32, timeout_ms: u16) -> Result<Wake> {
    let dev = unsafe { BorrowedFd::borrow_raw(dev_fd) };
    let stdin = unsafe { BorrowedFd::borrow_raw(libc::STDIN_FILENO) };
    let mut fds = [
        PollFd::new(dev, PollFlags::POLLIN),
        PollFd::new(stdin, PollFlags::POLLIN),
    ];
    let n = poll(&mut fds, timeout_ms).map_err(|e| DrmError::EventRead(e as i32))?;
    if n == 0 {
        return Ok(Wake::Timeout);
    }
    if fds[0].revents().unwrap_or(PollFlags::empty()).contains(PollFlags::POLLIN) {
        return Ok(Wake::Device);
    }
    Ok(Wake::Stdin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_on_quiet_fds() {
        // /dev/null never becomes POLLIN-quiet reliably, so use a pipe
        // with no writer activity.
        let mut fds = [0i32; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        // Swap stdin for the pipe read end is not possible here; just
        // exercise the device-fd path with a 10ms timeout.
        let wake = wait_device_or_stdin(fds[0], 10);
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
        // Either timeout, or stdin happened to be readable under the
        // test runner.
        assert!(matches!(wake, Ok(Wake::Timeout) | Ok(Wake::Stdin)));
    }
}
