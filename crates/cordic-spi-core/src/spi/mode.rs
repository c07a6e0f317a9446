//! SPI timing configuration
//!
//! The four canonical SPI modes are combinations of clock polarity (the
//! idle level of SCK) and clock phase (whether data is valid before or
//! after the leading edge):
//!
//! | Mode | CPOL | CPHA | Idle SCK | Sample edge |
//! |------|------|------|----------|-------------|
//! | 0    | 0    | 0    | low      | rising      |
//! | 1    | 0    | 1    | low      | falling     |
//! | 2    | 1    | 0    | high     | falling     |
//! | 3    | 1    | 1    | high     | rising      |

use crate::error::{Error, Result};

/// Default half-period delay in nanoseconds (40 ns SCK period, 25 MHz)
pub const DEFAULT_HALF_PERIOD_NS: u32 = 20;

/// Default settling delay between a clock edge and the MISO sample
pub const DEFAULT_SETTLE_NS: u32 = 1;

/// Clock polarity (CPOL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum ClockPolarity {
    /// Clock is low when idle (CPOL=0)
    IdleLow,
    /// Clock is high when idle (CPOL=1)
    IdleHigh,
}

impl ClockPolarity {
    /// Level of SCK while no transfer is in progress
    pub const fn idle_level(self) -> bool {
        matches!(self, Self::IdleHigh)
    }
}

/// Clock phase (CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum ClockPhase {
    /// Data valid before the leading edge, sampled on it (CPHA=0)
    CaptureOnFirstTransition,
    /// Data changes on the leading edge, sampled on the trailing edge (CPHA=1)
    CaptureOnSecondTransition,
}

/// Order in which the bits of a byte are shifted onto the bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

impl BitOrder {
    /// Bit positions in the order they are visited on the wire
    pub const fn positions(self) -> [u8; 8] {
        match self {
            Self::MsbFirst => [7, 6, 5, 4, 3, 2, 1, 0],
            Self::LsbFirst => [0, 1, 2, 3, 4, 5, 6, 7],
        }
    }
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// All four modes, in numeric order
    pub const ALL: [SpiMode; 4] = [Self::Mode0, Self::Mode1, Self::Mode2, Self::Mode3];

    /// Get clock polarity
    pub const fn polarity(self) -> ClockPolarity {
        match self {
            Self::Mode0 | Self::Mode1 => ClockPolarity::IdleLow,
            Self::Mode2 | Self::Mode3 => ClockPolarity::IdleHigh,
        }
    }

    /// Get clock phase
    pub const fn phase(self) -> ClockPhase {
        match self {
            Self::Mode0 | Self::Mode2 => ClockPhase::CaptureOnFirstTransition,
            Self::Mode1 | Self::Mode3 => ClockPhase::CaptureOnSecondTransition,
        }
    }

    /// Build a mode from its polarity and phase
    pub const fn from_parts(polarity: ClockPolarity, phase: ClockPhase) -> Self {
        match (polarity, phase) {
            (ClockPolarity::IdleLow, ClockPhase::CaptureOnFirstTransition) => Self::Mode0,
            (ClockPolarity::IdleLow, ClockPhase::CaptureOnSecondTransition) => Self::Mode1,
            (ClockPolarity::IdleHigh, ClockPhase::CaptureOnFirstTransition) => Self::Mode2,
            (ClockPolarity::IdleHigh, ClockPhase::CaptureOnSecondTransition) => Self::Mode3,
        }
    }

    /// Parse a mode number (0-3)
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Mode0),
            1 => Some(Self::Mode1),
            2 => Some(Self::Mode2),
            3 => Some(Self::Mode3),
            _ => None,
        }
    }

    /// Mode number (0-3)
    pub const fn number(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
            Self::Mode3 => 3,
        }
    }
}

/// Timing configuration for the bit-transfer engine
///
/// Immutable once handed to the engine. `half_period_ns` must be non-zero
/// and `settle_ns` must be strictly shorter than it; see [`validate`].
///
/// [`validate`]: SpiTimingConfig::validate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiTimingConfig {
    /// Idle level of SCK (CPOL)
    pub polarity: ClockPolarity,
    /// Whether data is valid before or after the leading edge (CPHA)
    pub phase: ClockPhase,
    /// Bit order on the wire
    pub bit_order: BitOrder,
    /// Half of the SCK period, in nanoseconds
    pub half_period_ns: u32,
    /// Delay between a sample edge and reading MISO, in nanoseconds
    pub settle_ns: u32,
}

impl Default for SpiTimingConfig {
    fn default() -> Self {
        Self::new(SpiMode::Mode0)
    }
}

impl SpiTimingConfig {
    /// Create a configuration for one of the canonical modes with default timing
    pub const fn new(mode: SpiMode) -> Self {
        Self {
            polarity: mode.polarity(),
            phase: mode.phase(),
            bit_order: BitOrder::MsbFirst,
            half_period_ns: DEFAULT_HALF_PERIOD_NS,
            settle_ns: DEFAULT_SETTLE_NS,
        }
    }

    /// The canonical mode this configuration corresponds to
    pub const fn mode(&self) -> SpiMode {
        SpiMode::from_parts(self.polarity, self.phase)
    }

    /// Set the SPI mode, keeping timing and bit order
    pub const fn with_mode(mut self, mode: SpiMode) -> Self {
        self.polarity = mode.polarity();
        self.phase = mode.phase();
        self
    }

    /// Set the bit order
    pub const fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Set the half-period delay in nanoseconds
    pub const fn with_half_period_ns(mut self, ns: u32) -> Self {
        self.half_period_ns = ns;
        self
    }

    /// Set the full SCK period in nanoseconds (odd periods round down)
    pub const fn with_period_ns(mut self, ns: u32) -> Self {
        self.half_period_ns = ns / 2;
        self
    }

    /// Set SPI speed in Hz (approximate, via half-period calculation)
    pub const fn with_speed_hz(mut self, hz: u32) -> Self {
        // half_period = 1_000_000_000 / (2 * frequency) in nanoseconds
        if hz > 0 {
            self.half_period_ns = 500_000_000 / hz;
        }
        self
    }

    /// Set the settling delay in nanoseconds
    pub const fn with_settle_ns(mut self, ns: u32) -> Self {
        self.settle_ns = ns;
        self
    }

    /// Level of SCK while idle
    pub const fn clock_idle_level(&self) -> bool {
        self.polarity.idle_level()
    }

    /// Whether MISO is sampled on the leading edge of each bit
    pub const fn samples_on_leading_edge(&self) -> bool {
        matches!(self.phase, ClockPhase::CaptureOnFirstTransition)
    }

    /// Full SCK period in nanoseconds
    pub const fn period_ns(&self) -> u32 {
        self.half_period_ns.saturating_mul(2)
    }

    /// Check the timing invariants
    pub fn validate(&self) -> Result<()> {
        if self.half_period_ns == 0 {
            return Err(Error::InvalidHalfPeriod);
        }
        if self.settle_ns >= self.half_period_ns {
            return Err(Error::InvalidSettleDelay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_table() {
        assert_eq!(SpiMode::Mode0.polarity(), ClockPolarity::IdleLow);
        assert_eq!(SpiMode::Mode0.phase(), ClockPhase::CaptureOnFirstTransition);
        assert_eq!(SpiMode::Mode1.polarity(), ClockPolarity::IdleLow);
        assert_eq!(SpiMode::Mode1.phase(), ClockPhase::CaptureOnSecondTransition);
        assert_eq!(SpiMode::Mode2.polarity(), ClockPolarity::IdleHigh);
        assert_eq!(SpiMode::Mode2.phase(), ClockPhase::CaptureOnFirstTransition);
        assert_eq!(SpiMode::Mode3.polarity(), ClockPolarity::IdleHigh);
        assert_eq!(SpiMode::Mode3.phase(), ClockPhase::CaptureOnSecondTransition);
    }

    #[test]
    fn test_mode_parts_roundtrip() {
        for mode in SpiMode::ALL {
            assert_eq!(SpiMode::from_parts(mode.polarity(), mode.phase()), mode);
            assert_eq!(SpiMode::from_number(mode.number()), Some(mode));
            assert_eq!(SpiTimingConfig::new(mode).mode(), mode);
        }
        assert_eq!(SpiMode::from_number(4), None);
    }

    #[test]
    fn test_defaults() {
        let cfg = SpiTimingConfig::default();
        assert_eq!(cfg.mode(), SpiMode::Mode0);
        assert_eq!(cfg.bit_order, BitOrder::MsbFirst);
        assert_eq!(cfg.period_ns(), 40);
        assert_eq!(cfg.settle_ns, 1);
        assert!(!cfg.clock_idle_level());
        assert!(cfg.samples_on_leading_edge());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_speed_and_period() {
        let cfg = SpiTimingConfig::default().with_speed_hz(1_000_000);
        assert_eq!(cfg.half_period_ns, 500);

        let cfg = SpiTimingConfig::default().with_period_ns(100);
        assert_eq!(cfg.half_period_ns, 50);

        // zero speed leaves the half-period untouched
        let cfg = SpiTimingConfig::default().with_speed_hz(0);
        assert_eq!(cfg.half_period_ns, DEFAULT_HALF_PERIOD_NS);
    }

    #[test]
    fn test_validate() {
        let cfg = SpiTimingConfig::default().with_half_period_ns(0);
        assert_eq!(cfg.validate(), Err(Error::InvalidHalfPeriod));

        let cfg = SpiTimingConfig::default()
            .with_half_period_ns(10)
            .with_settle_ns(10);
        assert_eq!(cfg.validate(), Err(Error::InvalidSettleDelay));

        let cfg = SpiTimingConfig::default()
            .with_half_period_ns(10)
            .with_settle_ns(0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_bit_positions() {
        assert_eq!(BitOrder::MsbFirst.positions()[0], 7);
        assert_eq!(BitOrder::LsbFirst.positions()[0], 0);
    }
}
