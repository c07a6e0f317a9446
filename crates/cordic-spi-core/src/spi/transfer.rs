//! Bit-transfer engine
//!
//! Moves one byte per chip-select pulse. Every call follows the same shape:
//!
//! 1. Idle levels (SCK = CPOL, CS inactive, MOSI low), hold one half-period
//! 2. Assert CS, hold one half-period
//! 3. Clock 8 bits in the configured order and phase
//! 4. Deassert CS, hold one half-period
//!
//! Each bit takes three half-periods in both phases, so a byte transfer
//! lasts exactly 27 half-periods. The settling delay is carved out of the
//! half-period that follows the sample edge; it never lengthens a bit.
//!
//! Uses `maybe_async` to support both sync and async modes.

use super::{ClockPhase, SerialLines, SpiTimingConfig, Timeline};
use maybe_async::maybe_async;

/// Value shifted out on MOSI during read-only transfers
pub const FILLER_BYTE: u8 = 0x00;

/// Transfer one byte inside its own chip-select pulse
///
/// Returns the byte sampled from MISO. A received bit lands at the same
/// position as the bit transmitted in the same clock, so the result does
/// not depend on the bit order for a slave that shifts in its own order.
#[maybe_async]
pub async fn transfer_byte<B>(bus: &mut B, config: &SpiTimingConfig, tx: u8) -> u8
where
    B: SerialLines + Timeline + ?Sized,
{
    debug_assert!(
        config.validate().is_ok(),
        "invalid SPI timing: {:?}",
        config
    );

    let idle = config.clock_idle_level();
    let half = config.half_period_ns;

    // Idle window so a polling device sees stable levels before CS
    bus.set_sck(idle);
    bus.set_cs(false);
    bus.set_mosi(false);
    bus.delay_ns(half).await;

    bus.set_cs(true);
    bus.delay_ns(half).await;

    let mut rx = 0u8;
    for pos in config.bit_order.positions() {
        let bit = (tx >> pos) & 1 != 0;
        let sampled = match config.phase {
            ClockPhase::CaptureOnFirstTransition => {
                clock_bit_sample_leading(bus, config, bit).await
            }
            ClockPhase::CaptureOnSecondTransition => {
                clock_bit_sample_trailing(bus, config, bit).await
            }
        };
        if sampled {
            rx |= 1 << pos;
        }
    }

    bus.set_cs(false);
    bus.delay_ns(half).await;

    log::trace!("spi: tx=0x{:02x} rx=0x{:02x}", tx, rx);
    rx
}

/// CPHA=0: MOSI valid before the leading edge, MISO sampled on it
#[maybe_async]
async fn clock_bit_sample_leading<B>(bus: &mut B, config: &SpiTimingConfig, bit: bool) -> bool
where
    B: SerialLines + Timeline + ?Sized,
{
    let idle = config.clock_idle_level();
    let half = config.half_period_ns;
    let settle = config.settle_ns;

    bus.set_mosi(bit);
    bus.delay_ns(half).await;

    // Leading (sample) edge
    bus.set_sck(!idle);
    bus.delay_ns(settle).await;
    let sampled = bus.get_miso();
    bus.delay_ns(half.saturating_sub(settle)).await;

    // Trailing (shift) edge
    bus.set_sck(idle);
    bus.delay_ns(half).await;

    sampled
}

/// CPHA=1: MOSI changes on the leading edge, MISO sampled on the trailing edge
#[maybe_async]
async fn clock_bit_sample_trailing<B>(bus: &mut B, config: &SpiTimingConfig, bit: bool) -> bool
where
    B: SerialLines + Timeline + ?Sized,
{
    let idle = config.clock_idle_level();
    let half = config.half_period_ns;
    let settle = config.settle_ns;

    bus.delay_ns(half).await;

    // Leading (shift) edge
    bus.set_sck(!idle);
    bus.set_mosi(bit);
    bus.delay_ns(half).await;

    // Trailing (sample) edge
    bus.set_sck(idle);
    bus.delay_ns(settle).await;
    let sampled = bus.get_miso();
    bus.delay_ns(half.saturating_sub(settle)).await;

    sampled
}

/// Write bytes, one chip-select pulse per byte, discarding what comes back
#[maybe_async]
pub async fn write_bytes<B>(bus: &mut B, config: &SpiTimingConfig, bytes: &[u8])
where
    B: SerialLines + Timeline + ?Sized,
{
    for &byte in bytes {
        transfer_byte(bus, config, byte).await;
    }
}

/// Read `buf.len()` bytes, one chip-select pulse per byte, sending [`FILLER_BYTE`]
#[maybe_async]
pub async fn read_bytes<B>(bus: &mut B, config: &SpiTimingConfig, buf: &mut [u8])
where
    B: SerialLines + Timeline + ?Sized,
{
    for byte in buf.iter_mut() {
        *byte = transfer_byte(bus, config, FILLER_BYTE).await;
    }
}
