//! cordic-spi-sim - Virtual-time SPI bus and CORDIC device emulator
//!
//! This crate provides an in-memory bus that implements the serial line and
//! timeline traits of `cordic-spi-core` on a virtual clock. Attached to it
//! is an [`SpiSlave`]: either a trivial [`Loopback`] or a [`CordicDevice`]
//! that behaves like the real compute unit on the wire. It's useful for
//! testing and development without a simulator or real hardware.
//!
//! Time only moves inside `delay_ns` and `wait_clock_edge`, so every signal
//! change carries an exact timestamp and can be recorded in a [`Trace`].

mod bus;
mod device;
mod trace;

pub use bus::{Loopback, SimBus, SpiSlave, DEFAULT_SYS_CLOCK_PERIOD_NS};
pub use device::{CordicDevice, DeviceState, Responder, ShiftRegister};
pub use trace::{Signal, Trace, TraceEvent};
