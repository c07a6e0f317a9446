//! cordic-spi - SPI exchange tool for CORDIC units
//!
//! Drives the unit's four-wire SPI port with a bit-level master, one
//! chip-select pulse per byte:
//!
//! - **Write** the 8-byte input frame (x, y, alpha, atan0)
//! - **Wait** for the ready line, bounded by a number of clock cycles
//! - **Read** the 6-byte output frame (alpha, cos, sin)
//!
//! The same exchange runs against the simulated unit (`sim`) or real
//! wires through Linux GPIO (`linux_gpio`).

mod backends;
mod cli;
mod commands;
mod config;

use clap::Parser;
use cli::{Cli, Commands, SpiArgs};
use config::{Profile, Settings};

fn resolve_settings(
    profile: &Profile,
    spi: &SpiArgs,
    backend: Option<&str>,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = profile.resolve(spi, backend)?;
    log::debug!("Using backend '{}'", settings.backend);
    Ok(settings)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let profile = match cli.config.as_deref() {
        Some(path) => match Profile::load(path) {
            Ok(profile) => profile,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Profile::default(),
    };

    let result = match cli.command {
        Commands::Encode { operands } => commands::codec::run_encode(&operands.to_frame()),
        Commands::Decode { bytes } => commands::codec::run_decode(&bytes),
        Commands::Exchange {
            backend,
            operands,
            spi,
        } => resolve_settings(&profile, &spi, backend.as_deref())
            .and_then(|settings| commands::exchange::run(&settings, &operands.to_frame())),
        Commands::Sweep {
            backend,
            operands,
            start,
            end,
            step,
            spi,
        } => resolve_settings(&profile, &spi, backend.as_deref()).and_then(|settings| {
            commands::exchange::run_sweep(&settings, &operands.to_frame(), start, end, step)
        }),
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
