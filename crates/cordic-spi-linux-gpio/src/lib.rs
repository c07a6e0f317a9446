//! cordic-spi-linux-gpio - Linux GPIO bitbang backend
//!
//! Drives the CORDIC unit's serial interface from ordinary GPIO pins using
//! the Linux GPIO character device (gpiocdev). Besides the four SPI lines
//! it reads the unit's ready output so an exchange can poll it.
//!
//! # Example
//!
//! ```no_run
//! use cordic_spi_linux_gpio::{LinuxGpioBus, LinuxGpioConfig};
//! use cordic_spi_core::exchange::run_exchange;
//! use cordic_spi_core::frame::InputFrame;
//! use cordic_spi_core::spi::SpiTimingConfig;
//!
//! let config = LinuxGpioConfig::new("/dev/gpiochip0", 25, 11, 10, 9, 8);
//! //                                 device          CS  SCK MOSI MISO READY
//! let mut bus = LinuxGpioBus::open(&config)?;
//!
//! let timing = SpiTimingConfig::default().with_speed_hz(100_000);
//! let input = InputFrame::new(0x09b8, 0x0000, 0x3244, 0x0c91);
//! let out = run_exchange(&mut bus, &timing, &input, |b| b.is_ready(), 10_000)?;
//! println!("cos=0x{:04x} sin=0x{:04x}", out.cos, out.sin);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Wiring
//!
//! | Unit pin | GPIO function   | Description |
//! |----------|-----------------|-------------|
//! | CS_N     | CS (output)     | Chip select, active low |
//! | SCLK     | SCK (output)    | Serial clock |
//! | MOSI     | MOSI (output)   | Master out, slave in |
//! | MISO     | MISO (input)    | Master in, slave out |
//! | READY    | READY (input)   | Result available |
//!
//! Delays are implemented with `std::thread::sleep`, so real bit rates are
//! limited by scheduler granularity rather than the configured half-period.

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpioBus, LinuxGpioConfig};
pub use error::{LinuxGpioError, Result};
