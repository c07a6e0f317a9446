//! Serial line and timing capabilities
//!
//! The engine never owns the pins it toggles. It is handed something that
//! implements [`SerialLines`] (instantaneous get/set of the four signals)
//! and [`Timeline`] (the only places where execution suspends). A simulator,
//! a GPIO character device, or a microcontroller port can all provide them.
//!
//! `Timeline` uses `maybe_async`:
//! - By default it is async (suitable for Embassy or a cooperative simulator)
//! - With the `is_sync` feature it becomes blocking

use maybe_async::maybe_async;

/// Instantaneous access to the four SPI signals
///
/// Writes take effect immediately and are not buffered. Implementations
/// that can fail (e.g. GPIO ioctls) should log the error and carry on.
pub trait SerialLines {
    /// Set chip select (CS is active low, so `active=true` means CS=0)
    fn set_cs(&mut self, active: bool);

    /// Set clock line value
    fn set_sck(&mut self, high: bool);

    /// Set MOSI line value
    fn set_mosi(&mut self, high: bool);

    /// Get MISO line value
    fn get_miso(&self) -> bool;
}

/// Time-stepping primitive shared by the engine and the orchestrator
///
/// `delay_ns(d)` must not return before `d` has elapsed, and no signal
/// change may be reordered across it.
#[maybe_async(AFIT)]
pub trait Timeline {
    /// Suspend for exactly `ns` nanoseconds
    async fn delay_ns(&mut self, ns: u32);

    /// Suspend until the next rising edge of the system clock
    async fn wait_clock_edge(&mut self);
}
