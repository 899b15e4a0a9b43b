//! Provided backend implementations.

pub mod gem;
pub mod heap;
