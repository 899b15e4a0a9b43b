//! Cross-process advisory lock over a named POSIX semaphore.
//!
//! An in-process mutex cannot coordinate unrelated processes sharing a
//! display surface, so the manager keeps a named semaphore beside it.
//! The state machine {Unopened, Unlocked, Locked} makes repeated lock
//! and unlock calls defined no-ops instead of semaphore corruption.

use drm_core::{ddebug, derror};

use std::ffi::CString;

use crate::error::{BufMgrError, Result};

/// Semaphore name used when the caller does not pick one.
pub const DEFAULT_SEM_NAME: &str = "pixmap_1";

/// Bounded retries when a wait or post is interrupted by a signal.
const NUM_TRY_LOCK: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemState {
    Unopened,
    Unlocked,
    Locked,
}

pub struct NamedSemaphore {
    name: CString,
    sem: *mut libc::sem_t,
    state: SemState,
}

use drm_core::last_errno as errno;

impl NamedSemaphore {
    pub fn new(name: &str) -> Result<Self> {
        let name = CString::new(format!("/{}", name.trim_start_matches('/')))
            .map_err(|_| BufMgrError::InvalidArgument("semaphore name with NUL"))?;
        Ok(Self {
            name,
            sem: libc::SEM_FAILED,
            state: SemState::Unopened,
        })
    }

    pub fn state(&self) -> SemState {
        self.state
    }

    fn open(&mut self) -> Result<()> {
        let sem = unsafe {
            libc::sem_open(
                self.name.as_ptr(),
                libc::O_CREAT,
                0o777 as libc::mode_t,
                1 as libc::c_uint,
            )
        };
        if sem == libc::SEM_FAILED {
            let e = errno();
            derror!("sem_open {:?} failed: errno {}", self.name, e);
            return Err(BufMgrError::Semaphore {
                op: "open",
                errno: e,
            });
        }
        self.sem = sem;
        self.state = SemState::Unlocked;
        ddebug!("semaphore {:?} opened", self.name);
        Ok(())
    }

    /// Take the lock. Opens the semaphore on first use. Returns false
    /// as a no-op when already locked.
    pub fn lock(&mut self) -> Result<bool> {
        if self.state == SemState::Unopened {
            self.open()?;
        }
        if self.state != SemState::Unlocked {
            return Ok(false);
        }
        let mut tries = 0;
        loop {
            if unsafe { libc::sem_wait(self.sem) } == 0 {
                break;
            }
            let e = errno();
            tries += 1;
            if e != libc::EINTR || tries >= NUM_TRY_LOCK {
                return Err(BufMgrError::Semaphore {
                    op: "wait",
                    errno: e,
                });
            }
        }
        self.state = SemState::Locked;
        Ok(true)
    }

    /// Release the lock. Returns false as a no-op when not locked.
    pub fn unlock(&mut self) -> Result<bool> {
        if self.state != SemState::Locked {
            return Ok(false);
        }
        let mut tries = 0;
        loop {
            if unsafe { libc::sem_post(self.sem) } == 0 {
                break;
            }
            let e = errno();
            tries += 1;
            if e != libc::EINTR || tries >= NUM_TRY_LOCK {
                return Err(BufMgrError::Semaphore {
                    op: "post",
                    errno: e,
                });
            }
        }
        self.state = SemState::Unlocked;
        Ok(true)
    }

    /// Close and unlink, from any state.
    pub fn close(&mut self) {
        if self.state == SemState::Unopened {
            return;
        }
        unsafe {
            libc::sem_close(self.sem);
            libc::sem_unlink(self.name.as_ptr());
        }
        self.sem = libc::SEM_FAILED;
        self.state = SemState::Unopened;
    }
}

impl Drop for NamedSemaphore {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("slp-test-{}-{}", tag, std::process::id())
    }

    #[test]
    fn test_lock_then_unlock() {
        let mut sem = NamedSemaphore::new(&unique_name("basic")).unwrap();
        assert_eq!(sem.state(), SemState::Unopened);
        assert!(sem.lock().unwrap());
        assert_eq!(sem.state(), SemState::Locked);
        assert!(sem.unlock().unwrap());
        assert_eq!(sem.state(), SemState::Unlocked);
        sem.close();
    }

    #[test]
    fn test_double_lock_is_noop() {
        let mut sem = NamedSemaphore::new(&unique_name("dlock")).unwrap();
        assert!(sem.lock().unwrap());
        assert!(!sem.lock().unwrap());
        assert!(sem.unlock().unwrap());
        sem.close();
    }

    #[test]
    fn test_unlock_without_lock_is_noop() {
        let mut sem = NamedSemaphore::new(&unique_name("noop")).unwrap();
        assert!(!sem.unlock().unwrap());
        assert!(sem.lock().unwrap());
        assert!(sem.unlock().unwrap());
        assert!(!sem.unlock().unwrap());
        sem.close();
    }

    #[test]
    fn test_close_from_any_state() {
        let mut sem = NamedSemaphore::new(&unique_name("close")).unwrap();
        sem.close();
        assert!(sem.lock().unwrap());
        sem.close();
        assert_eq!(sem.state(), SemState::Unopened);
    }

    #[test]
    fn test_name_with_nul_rejected() {
        assert!(matches!(
            NamedSemaphore::new("bad\0name"),
            Err(BufMgrError::InvalidArgument(_))
        ));
    }
}
