//! Transfer orchestrator
//!
//! One exchange with the CORDIC unit runs three phases that never overlap:
//!
//! 1. Write the 8-byte input frame (one chip-select pulse per byte)
//! 2. Poll the device's ready signal once per system-clock edge, bounded
//! 3. Read the 6-byte output frame, sending filler bytes
//!
//! A timeout in phase 2 aborts the exchange before any read-phase byte is
//! clocked. The caller may retry the whole exchange.
//!
//! Uses `maybe_async` to support both sync and async modes.

use crate::error::{Error, Result};
use crate::frame::{InputFrame, OutputFrame, OUTPUT_FRAME_LEN};
use crate::spi::{read_bytes, write_bytes, SerialLines, SpiTimingConfig, Timeline};
use maybe_async::maybe_async;

/// Default number of system-clock cycles to wait for ready
pub const DEFAULT_MAX_POLL_CYCLES: u32 = 10_000;

/// Wait for the ready predicate to hold
///
/// Advances one system-clock edge, then evaluates `ready`, at most
/// `max_poll_cycles` times. Returns the number of cycles it took.
#[maybe_async]
pub async fn wait_ready<B, F>(bus: &mut B, mut ready: F, max_poll_cycles: u32) -> Result<u32>
where
    B: Timeline + ?Sized,
    F: FnMut(&mut B) -> bool,
{
    for cycle in 1..=max_poll_cycles {
        bus.wait_clock_edge().await;
        if ready(&mut *bus) {
            return Ok(cycle);
        }
    }
    Err(Error::ReadyTimeout {
        polls: max_poll_cycles,
    })
}

/// Run one full write / wait / read exchange
///
/// `ready` is handed the bus so it can read the ready signal from the same
/// device handle that carries the serial lines.
#[maybe_async]
pub async fn run_exchange<B, F>(
    bus: &mut B,
    config: &SpiTimingConfig,
    input: &InputFrame,
    ready: F,
    max_poll_cycles: u32,
) -> Result<OutputFrame>
where
    B: SerialLines + Timeline + ?Sized,
    F: FnMut(&mut B) -> bool,
{
    let tx = input.encode();
    log::debug!("exchange: TX bytes (LSB first): {:02x?}", tx);
    write_bytes(bus, config, &tx).await;

    let cycles = match wait_ready(bus, ready, max_poll_cycles).await {
        Ok(cycles) => cycles,
        Err(e) => {
            log::warn!("exchange: {}", e);
            return Err(e);
        }
    };
    log::debug!("exchange: device ready after {} clock cycles", cycles);

    let mut rx = [0u8; OUTPUT_FRAME_LEN];
    read_bytes(bus, config, &mut rx).await;
    log::debug!("exchange: RX bytes: {:02x?}", rx);

    let output = OutputFrame::decode(&rx)?;
    log::debug!(
        "exchange: parsed alpha=0x{:04x} cos=0x{:04x} sin=0x{:04x}",
        output.alpha,
        output.cos,
        output.sin
    );
    Ok(output)
}
