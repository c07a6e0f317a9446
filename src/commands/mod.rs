//! CLI command implementations
//!
//! - `codec` - offline frame encoding and decoding, no backend needed
//! - `exchange` - single exchanges and angle sweeps against a backend

pub mod codec;
pub mod exchange;
mod list;

pub use list::list_backends;
