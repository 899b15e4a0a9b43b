//! DRM event stream handling.
//!
//! The kernel posts variable-length event records to the device fd
//! (vblank, page-flip complete, driver-private types). `wait_readable`
//! blocks with a timeout, `handle_event` does one read(2) and walks the
//! concatenated records, dispatching each to an `EventHandler`.

use crate::device::Device;
use crate::error::{DrmError, Result};
use crate::sys::{DrmEvent, DrmEventVblank, DRM_EVENT_FLIP_COMPLETE, DRM_EVENT_VBLANK};

use nix::poll::{poll, PollFd, PollFlags};
use std::mem::size_of;
use std::os::fd::BorrowedFd;

/// Read buffer for one `handle_event` call. Matches what the kernel can
/// queue between wakeups in practice.
const EVENT_BUF_SIZE: usize = 1024;

/// Payload of a vblank or flip-complete event.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageFlipEvent {
    pub user_data: u64,
    pub tv_sec: u32,
    pub tv_usec: u32,
    pub sequence: u32,
}

/// Per-event callbacks for `handle_event`.
///
/// Default impls ignore the event, so a handler only overrides what it
/// consumes. Vendor events arrive as the raw record bytes (header
/// included); the vendor crate knows the layout.
pub trait EventHandler {
    fn vblank(&mut self, _ev: &PageFlipEvent) {}
    fn page_flip(&mut self, _ev: &PageFlipEvent) {}
    fn vendor(&mut self, _event_type: u32, _record: &[u8]) {}
}

/// Block until the device fd is readable or `timeout_ms` elapses.
/// Returns false on timeout.
pub fn wait_readable(dev: &Device, timeout_ms: u16) -> Result<bool> {
    let borrowed = unsafe { BorrowedFd::borrow_raw(dev.fd()) };
    let mut fds = [PollFd::new(borrowed, PollFlags::POLLIN)];
    let n = poll(&mut fds, timeout_ms).map_err(|e| DrmError::EventRead(e as i32))?;
    Ok(n > 0)
}

/// One read(2) from the device fd, dispatching every complete record.
pub fn handle_event(dev: &Device, handler: &mut dyn EventHandler) -> Result<()> {
    let mut buf = [0u8; EVENT_BUF_SIZE];
    let n = unsafe {
        libc::read(
            dev.fd(),
            buf.as_mut_ptr() as *mut libc::c_void,
            buf.len(),
        )
    };
    if n < 0 {
        return Err(DrmError::EventRead(crate::error::last_errno()));
    }
    dispatch_event_buffer(&buf[..n as usize], handler);
    Ok(())
}

/// Walk concatenated event records by their self-declared lengths.
///
/// Truncated or absurd records end the walk; the kernel never splits a
/// record across reads.
pub fn dispatch_event_buffer(buf: &[u8], handler: &mut dyn EventHandler) {
    let hdr = size_of::<DrmEvent>();
    let mut i = 0usize;

    while i + hdr <= buf.len() {
        let ev: DrmEvent =
            unsafe { std::ptr::read_unaligned(buf[i..].as_ptr() as *const DrmEvent) };
        let len = ev.length as usize;
        if len < hdr || i + len > buf.len() {
            break;
        }
        let record = &buf[i..i + len];
        match ev.type_ {
            DRM_EVENT_VBLANK => handler.vblank(&parse_vblank(record)),
            DRM_EVENT_FLIP_COMPLETE => handler.page_flip(&parse_vblank(record)),
            other => handler.vendor(other, record),
        }
        i += len;
    }
}

fn parse_vblank(record: &[u8]) -> PageFlipEvent {
    if record.len() < size_of::<DrmEventVblank>() {
        return PageFlipEvent::default();
    }
    let raw: DrmEventVblank =
        unsafe { std::ptr::read_unaligned(record.as_ptr() as *const DrmEventVblank) };
    PageFlipEvent {
        user_data: raw.user_data,
        tv_sec: raw.tv_sec,
        tv_usec: raw.tv_usec,
        sequence: raw.sequence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        flips: Vec<PageFlipEvent>,
        vblanks: usize,
        vendor: Vec<(u32, usize)>,
    }

    impl EventHandler for Recorder {
        fn vblank(&mut self, _ev: &PageFlipEvent) {
            self.vblanks += 1;
        }
        fn page_flip(&mut self, ev: &PageFlipEvent) {
            self.flips.push(*ev);
        }
        fn vendor(&mut self, event_type: u32, record: &[u8]) {
            self.vendor.push((event_type, record.len()));
        }
    }

    fn vblank_bytes(type_: u32, user_data: u64, sequence: u32) -> Vec<u8> {
        let ev = DrmEventVblank {
            base: DrmEvent {
                type_,
                length: size_of::<DrmEventVblank>() as u32,
            },
            user_data,
            tv_sec: 1,
            tv_usec: 2,
            sequence,
            reserved: 0,
        };
        let mut out = vec![0u8; size_of::<DrmEventVblank>()];
        unsafe {
            std::ptr::copy_nonoverlapping(
                &ev as *const _ as *const u8,
                out.as_mut_ptr(),
                out.len(),
            );
        }
        out
    }

    #[test]
    fn test_dispatch_splits_concatenated_records() {
        let mut buf = vblank_bytes(DRM_EVENT_FLIP_COMPLETE, 77, 60);
        buf.extend(vblank_bytes(DRM_EVENT_VBLANK, 0, 1));
        // Vendor record: header plus 8 payload bytes.
        let vendor_len = size_of::<DrmEvent>() as u32 + 8;
        buf.extend(0x8000_0000u32.to_ne_bytes());
        buf.extend(vendor_len.to_ne_bytes());
        buf.extend([0u8; 8]);

        let mut rec = Recorder::default();
        dispatch_event_buffer(&buf, &mut rec);

        assert_eq!(rec.flips.len(), 1);
        assert_eq!(rec.flips[0].user_data, 77);
        assert_eq!(rec.flips[0].sequence, 60);
        assert_eq!(rec.vblanks, 1);
        assert_eq!(rec.vendor, vec![(0x8000_0000, vendor_len as usize)]);
    }

    #[test]
    fn test_dispatch_stops_on_truncated_record() {
        let mut buf = vblank_bytes(DRM_EVENT_FLIP_COMPLETE, 1, 1);
        // Claimed length runs past the buffer.
        buf.extend(DRM_EVENT_VBLANK.to_ne_bytes());
        buf.extend(64u32.to_ne_bytes());

        let mut rec = Recorder::default();
        dispatch_event_buffer(&buf, &mut rec);

        assert_eq!(rec.flips.len(), 1);
        assert_eq!(rec.vblanks, 0);
    }

    #[test]
    fn test_dispatch_empty_buffer() {
        let mut rec = Recorder::default();
        dispatch_event_buffer(&[], &mut rec);
        assert!(rec.flips.is_empty());
        assert_eq!(rec.vblanks, 0);
    }
}
