//! Memory effect and pointer capture summaries.
//!
//! These are the compact facts optimization passes consult instead of walking
//! a callee's body: which categories of memory an operation may read or
//! write ([`MemoryEffects`]), and which parts of a pointer argument may
//! escape through the return value or elsewhere ([`CaptureInfo`]).
//!
//! Every type here is a small `Copy` value. Combinators return new values,
//! and the packed integer form (`to_int_value` / `from_int_value`) is what
//! gets stored in function attributes.

pub mod capture;
pub mod error;
pub mod location;
pub mod memory_effects;
pub mod mod_ref;

pub use capture::{CaptureComponents, CaptureInfo};
pub use error::ParseError;
pub use location::{IrMemLocation, MemLocation};
pub use memory_effects::{MemoryEffects, MemoryEffectsBase};
pub use mod_ref::ModRefInfo;
