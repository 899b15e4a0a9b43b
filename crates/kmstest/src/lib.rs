//! # kmstest
//!
//! Shared scaffolding for the `cmd/` demo binaries: resource dump
//! tables, connector-to-pipe resolution, test-pattern fills and BMP
//! dumps of result buffers.

#![allow(dead_code)]

pub mod bmp;
pub mod draw;
pub mod evloop;
pub mod resources;

pub use resources::{find_pipe, Pipe};
