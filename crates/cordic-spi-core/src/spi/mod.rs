//! SPI master primitives
//!
//! This module contains everything needed to move single bytes across the
//! serial interface:
//!
//! - [`SpiTimingConfig`] and the mode/phase/polarity/bit-order types
//! - [`SerialLines`] and [`Timeline`], the capabilities the engine drives
//! - [`transfer`], the bit-transfer engine itself

mod lines;
mod mode;
pub mod transfer;

pub use lines::{SerialLines, Timeline};
pub use mode::{
    BitOrder, ClockPhase, ClockPolarity, SpiMode, SpiTimingConfig, DEFAULT_HALF_PERIOD_NS,
    DEFAULT_SETTLE_NS,
};
pub use transfer::{read_bytes, transfer_byte, write_bytes, FILLER_BYTE};
