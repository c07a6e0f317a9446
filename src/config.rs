//! Exchange profile loading
//!
//! Profiles are TOML files that pin down the timing and poll settings for
//! a particular unit, so they don't have to be repeated on every command
//! line:
//!
//! ```toml
//! [spi]
//! mode = 1
//! bit_order = "msb_first"
//! period_ns = 40
//! settle_ns = 1
//!
//! [exchange]
//! backend = "sim:latency=64"
//! max_poll_cycles = 10000
//! ```
//!
//! Command-line flags override values from the file.

use std::fs;
use std::path::{Path, PathBuf};

use cordic_spi_core::exchange::DEFAULT_MAX_POLL_CYCLES;
use cordic_spi_core::spi::{BitOrder, SpiMode, SpiTimingConfig};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::SpiArgs;

/// Backend used when neither the command line nor the profile names one
pub const DEFAULT_BACKEND: &str = "sim";

/// Errors while loading or applying a profile
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Profile file could not be read
    #[error("Failed to read profile '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Profile file is not valid TOML or has unexpected keys
    #[error("Failed to parse profile '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// SPI mode outside 0-3
    #[error("Invalid SPI mode {0} (expected 0-3)")]
    InvalidMode(u8),

    /// Timing values violate the engine's invariants
    #[error("Invalid SPI timing: {0}")]
    InvalidTiming(#[source] cordic_spi_core::Error),
}

/// `[spi]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpiSection {
    pub mode: Option<u8>,
    pub bit_order: Option<BitOrder>,
    pub period_ns: Option<u32>,
    pub settle_ns: Option<u32>,
}

/// `[exchange]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExchangeSection {
    pub backend: Option<String>,
    pub max_poll_cycles: Option<u32>,
}

/// Parsed profile file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub spi: SpiSection,
    pub exchange: ExchangeSection,
}

/// Fully resolved exchange settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: String,
    pub timing: SpiTimingConfig,
    pub max_poll_cycles: u32,
}

impl Profile {
    /// Load a profile from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let profile = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded profile from {}", path.display());
        Ok(profile)
    }

    /// Parse a profile from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merge command-line overrides on top of this profile
    pub fn resolve(&self, args: &SpiArgs, backend: Option<&str>) -> Result<Settings, ConfigError> {
        let mode_number = args.mode.or(self.spi.mode).unwrap_or(0);
        let mode = SpiMode::from_number(mode_number).ok_or(ConfigError::InvalidMode(mode_number))?;

        let bit_order = if args.lsb_first {
            BitOrder::LsbFirst
        } else {
            self.spi.bit_order.unwrap_or_default()
        };

        let mut timing = SpiTimingConfig::new(mode).with_bit_order(bit_order);
        if let Some(period) = args.period_ns.or(self.spi.period_ns) {
            timing = timing.with_period_ns(period);
        }
        if let Some(settle) = args.settle_ns.or(self.spi.settle_ns) {
            timing = timing.with_settle_ns(settle);
        }
        timing.validate().map_err(ConfigError::InvalidTiming)?;

        let backend = backend
            .map(str::to_string)
            .or_else(|| self.exchange.backend.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND.to_string());

        let max_poll_cycles = args
            .max_poll
            .or(self.exchange.max_poll_cycles)
            .unwrap_or(DEFAULT_MAX_POLL_CYCLES);

        Ok(Settings {
            backend,
            timing,
            max_poll_cycles,
        })
    }
}
