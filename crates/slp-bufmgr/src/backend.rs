//! Backend capability interface.
//!
//! A backend is a strategy object owning whatever device state it needs
//! (a DRM fd, a heap). Each allocation yields a `BackendBuffer` whose
//! drop releases the backing store, so the free runs exactly once no
//! matter how the owning handle is shared.

use crate::error::Result;

/// Devices a mapping can target.
pub const DEVICE_DEFAULT: u32 = 0;
pub const DEVICE_CPU: u32 = 1;
pub const DEVICE_2D: u32 = 2;
pub const DEVICE_3D: u32 = 3;
pub const DEVICE_MM: u32 = 4;

/// Mapping intents.
pub const OPT_READ: u32 = 1 << 0;
pub const OPT_WRITE: u32 = 1 << 1;

/// Cache-flush flags, mirroring the Exynos cache-op bits.
pub const CACHE_INV: u32 = 4;
pub const CACHE_CLN: u32 = 8;
pub const CACHE_ALL: u32 = CACHE_INV | CACHE_CLN;

/// One allocated (or attached, or imported) buffer.
pub trait BackendBuffer {
    fn size(&self) -> u64;

    /// Global key another process can import. Stable across calls.
    fn export(&mut self) -> Result<u64>;

    /// Map for `device` access with `OPT_*` intents. Returns the CPU
    /// address; repeated maps return the same mapping.
    fn map(&mut self, device: u32, opt: u32) -> Result<*mut u8>;

    fn unmap(&mut self, device: u32) -> Result<()>;

    fn cache_flush(&mut self, flags: u32) -> Result<()>;
}

pub trait BufferBackend {
    fn name(&self) -> &'static str;

    fn alloc(&self, size: u64, flags: u32) -> Result<Box<dyn BackendBuffer>>;

    /// Wrap backing storage that already exists under a global key,
    /// checking it against the expected size.
    fn attach(&self, key: u64, size: u64) -> Result<Box<dyn BackendBuffer>>;

    /// Import an exported global key.
    fn import(&self, key: u64) -> Result<Box<dyn BackendBuffer>>;
}
