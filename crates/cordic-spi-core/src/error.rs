//! Error types for cordic-spi-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Exchange errors
    /// The device never signalled ready within the poll bound
    ReadyTimeout {
        /// Number of system-clock cycles that were polled
        polls: u32,
    },

    // Framing errors
    /// Not enough bytes to decode a frame
    Framing {
        /// Number of bytes the frame needs
        expected: usize,
        /// Number of bytes that were supplied
        found: usize,
    },

    // Configuration errors
    /// SPI half-period is zero
    InvalidHalfPeriod,
    /// Settling delay is not strictly shorter than the half-period
    InvalidSettleDelay,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadyTimeout { polls } => {
                write!(f, "timeout: device not ready after {} clock cycles", polls)
            }
            Self::Framing { expected, found } => {
                write!(
                    f,
                    "framing error: expected {} bytes, got {}",
                    expected, found
                )
            }
            Self::InvalidHalfPeriod => write!(f, "SPI half-period must be non-zero"),
            Self::InvalidSettleDelay => {
                write!(f, "settling delay must be shorter than the SPI half-period")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
