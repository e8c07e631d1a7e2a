//! Decoding and encoding of packed memory-effect and capture attributes.
//!
//! This backs the `modref` binary; the lattice types themselves live in
//! [`trunk_modref`].

pub mod error;
pub mod report;

pub use error::{Error, Result};
pub use report::{CaptureReport, LocationAccess, MemoryReport};
