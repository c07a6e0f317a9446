//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand};
use cordic_spi_core::frame::InputFrame;
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend to use [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "cordic-spi")]
#[command(author, version, about = "SPI exchange tool for CORDIC units", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Exchange profile (TOML with [spi] and [exchange] tables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// SPI timing options shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SpiArgs {
    /// SPI mode (0-3)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub mode: Option<u8>,

    /// Shift bits least significant first
    #[arg(long)]
    pub lsb_first: bool,

    /// SCK period in nanoseconds
    #[arg(long)]
    pub period_ns: Option<u32>,

    /// Delay between a sample edge and reading MISO, in nanoseconds
    #[arg(long)]
    pub settle_ns: Option<u32>,

    /// Maximum number of clock cycles to wait for ready
    #[arg(long)]
    pub max_poll: Option<u32>,
}

/// CORDIC input operands (hex or decimal; wider values are truncated to 16 bits)
#[derive(clap::Args, Debug, Clone)]
pub struct OperandArgs {
    /// Initial x coordinate
    #[arg(long, value_parser = parse_hex_u32, default_value = "0x09b8")]
    pub x: u32,

    /// Initial y coordinate
    #[arg(long, value_parser = parse_hex_u32, default_value = "0x0000")]
    pub y: u32,

    /// Rotation angle
    #[arg(long, value_parser = parse_hex_u32, default_value = "0x3244")]
    pub alpha: u32,

    /// First arctangent table entry
    #[arg(long, value_parser = parse_hex_u32, default_value = "0x0c91")]
    pub atan0: u32,
}

impl OperandArgs {
    /// Build the input frame, truncating oversized operands
    pub fn to_frame(&self) -> InputFrame {
        InputFrame::from_words_truncating(self.x, self.y, self.alpha, self.atan0)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the wire bytes for an input frame
    Encode {
        #[command(flatten)]
        operands: OperandArgs,
    },

    /// Decode received output bytes (e.g. "44 32 aa bb cc dd" or "4432aabbccdd")
    Decode {
        /// Hex bytes, separately or concatenated
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,
    },

    /// Run one write / wait-ready / read exchange
    Exchange {
        /// Backend to use
        #[arg(short, long, help = backend_help())]
        backend: Option<String>,

        #[command(flatten)]
        operands: OperandArgs,

        #[command(flatten)]
        spi: SpiArgs,
    },

    /// Run exchanges over a range of angles
    Sweep {
        /// Backend to use
        #[arg(short, long, help = backend_help())]
        backend: Option<String>,

        #[command(flatten)]
        operands: OperandArgs,

        /// First angle (replaces --alpha)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start: u32,

        /// Last angle, inclusive
        #[arg(long, value_parser = parse_hex_u32, default_value = "0x3244")]
        end: u32,

        /// Angle increment
        #[arg(long, value_parser = parse_hex_u32, default_value = "0x0400")]
        step: u32,

        #[command(flatten)]
        spi: SpiArgs,
    },

    /// List available backends
    ListBackends,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x3244"), Ok(0x3244));
        assert_eq!(parse_hex_u32("0X0c91"), Ok(0x0c91));
        assert_eq!(parse_hex_u32("42"), Ok(42));
        assert!(parse_hex_u32("0xzz").is_err());
    }

    #[test]
    fn test_exchange_defaults_to_reference_operands() {
        let cli = Cli::parse_from(["cordic-spi", "exchange", "--mode", "1"]);
        match cli.command {
            Commands::Exchange {
                backend,
                operands,
                spi,
            } => {
                assert!(backend.is_none());
                assert_eq!(
                    operands.to_frame(),
                    InputFrame::new(0x09b8, 0x0000, 0x3244, 0x0c91)
                );
                assert_eq!(spi.mode, Some(1));
            }
            _ => panic!("expected exchange"),
        }
    }

    #[test]
    fn test_mode_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["cordic-spi", "exchange", "--mode", "4"]).is_err());
    }
}
