//! cordic-spi-core - SPI master and framing for serially controlled CORDIC units
//!
//! This crate provides a bit-accurate software SPI master and the framing
//! protocol used to talk to a CORDIC compute unit over a single SPI-like
//! bus. It is designed to be `no_std` compatible so the same code can drive
//! a simulator, a Linux GPIO bitbang adapter, or a microcontroller.
//!
//! The unit accepts an 8-byte input frame (four 16-bit words), raises a
//! "ready" signal once the computation is done, and then yields a 6-byte
//! output frame (three 16-bit words). Every byte travels in its own
//! chip-select pulse.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc` and serde derives)
//! - `alloc` - Enable heap allocation
//! - `is_sync` - Compile the timing traits and engine as blocking code
//!
//! # Example
//!
//! ```ignore
//! use cordic_spi_core::exchange;
//! use cordic_spi_core::frame::InputFrame;
//! use cordic_spi_core::spi::{SerialLines, SpiTimingConfig, Timeline};
//!
//! fn rotate<B, F>(bus: &mut B, ready: F)
//! where
//!     B: SerialLines + Timeline,
//!     F: FnMut(&mut B) -> bool,
//! {
//!     let config = SpiTimingConfig::default();
//!     let input = InputFrame::new(0x09b8, 0x0000, 0x3244, 0x0c91);
//!     match exchange::run_exchange(bus, &config, &input, ready, 10_000) {
//!         Ok(out) => println!("cos=0x{:04x} sin=0x{:04x}", out.cos, out.sin),
//!         Err(e) => println!("exchange failed: {}", e),
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod exchange;
pub mod frame;
pub mod spi;

pub use error::{Error, Result};
