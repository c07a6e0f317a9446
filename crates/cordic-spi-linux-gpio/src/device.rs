//! Linux GPIO serial bus implementation
//!
//! This module provides the `LinuxGpioBus` struct that implements the
//! `SerialLines` and `Timeline` traits using Linux's GPIO character device
//! interface (gpiocdev).

use crate::error::{LinuxGpioError, Result};

use std::time::Duration;

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use cordic_spi_core::spi::{SerialLines, Timeline};

/// Default interval between ready polls in nanoseconds
///
/// There is no shared system clock with the unit, so one "clock edge" of
/// the orchestrator's poll loop is one interval of this length.
const DEFAULT_POLL_INTERVAL_NS: u64 = 1000;

/// Configuration for opening a Linux GPIO bus
#[derive(Debug, Clone)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// CS (Chip Select) GPIO line offset
    pub cs: Offset,
    /// SCK (Clock) GPIO line offset
    pub sck: Offset,
    /// MOSI (Master Out Slave In) GPIO line offset
    pub mosi: Offset,
    /// MISO (Master In Slave Out) GPIO line offset
    pub miso: Offset,
    /// READY GPIO line offset
    pub ready: Offset,
    /// READY is asserted low instead of high
    pub ready_active_low: bool,
    /// Interval between ready polls in nanoseconds
    pub poll_interval_ns: u64,
}

impl Default for LinuxGpioConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            cs: 0,
            sck: 0,
            mosi: 0,
            miso: 0,
            ready: 0,
            ready_active_low: false,
            poll_interval_ns: DEFAULT_POLL_INTERVAL_NS,
        }
    }
}

impl LinuxGpioConfig {
    /// Create a new configuration with the given device path and pins
    pub fn new(
        device: impl Into<String>,
        cs: Offset,
        sck: Offset,
        mosi: Offset,
        miso: Offset,
        ready: Offset,
    ) -> Self {
        Self {
            device: device.into(),
            cs,
            sck,
            mosi,
            miso,
            ready,
            ..Default::default()
        }
    }

    /// Set the interval between ready polls in nanoseconds
    pub fn with_poll_interval_ns(mut self, ns: u64) -> Self {
        self.poll_interval_ns = ns;
        self
    }

    /// Treat READY as active low
    pub fn with_ready_active_low(mut self, active_low: bool) -> Self {
        self.ready_active_low = active_low;
        self
    }

    fn check_distinct_lines(&self) -> Result<()> {
        let lines = [
            ("cs", self.cs),
            ("sck", self.sck),
            ("mosi", self.mosi),
            ("miso", self.miso),
            ("ready", self.ready),
        ];
        for (i, &(first, offset)) in lines.iter().enumerate() {
            if let Some(&(second, _)) = lines[i + 1..].iter().find(|(_, o)| *o == offset) {
                return Err(LinuxGpioError::DuplicateLine {
                    offset,
                    first,
                    second,
                });
            }
        }
        Ok(())
    }
}

/// Linux GPIO bitbang bus for the CORDIC unit
pub struct LinuxGpioBus {
    /// GPIO line request handle
    request: Request,
    cs: Offset,
    sck: Offset,
    mosi: Offset,
    miso: Offset,
    ready: Offset,
    ready_active_low: bool,
    poll_interval: Duration,
}

impl LinuxGpioBus {
    /// Open a Linux GPIO bus with the given configuration
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }
        config.check_distinct_lines()?;

        log::debug!("linux_gpio: Opening device {}", config.device);

        // Initial state: CS=1 (high/inactive), SCK=0, MOSI=0, MISO/READY=input
        let mut req_config = Config::default();
        req_config.with_line(config.cs).as_output(Value::Active);
        req_config.with_line(config.sck).as_output(Value::Inactive);
        req_config.with_line(config.mosi).as_output(Value::Inactive);
        req_config.with_line(config.miso).as_input();
        req_config.with_line(config.ready).as_input();

        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer("cordic-spi")
            .request()
            .map_err(LinuxGpioError::LineRequestFailed)?;

        log::info!(
            "linux_gpio: Opened {} (cs={}, sck={}, mosi={}, miso={}, ready={}{})",
            config.device,
            config.cs,
            config.sck,
            config.mosi,
            config.miso,
            config.ready,
            if config.ready_active_low {
                " active-low"
            } else {
                ""
            }
        );

        Ok(Self {
            request,
            cs: config.cs,
            sck: config.sck,
            mosi: config.mosi,
            miso: config.miso,
            ready: config.ready,
            ready_active_low: config.ready_active_low,
            poll_interval: Duration::from_nanos(config.poll_interval_ns),
        })
    }

    /// Read the unit's ready output
    pub fn is_ready(&self) -> bool {
        match self.request.value(self.ready) {
            Ok(value) => matches!(value, Value::Active) != self.ready_active_low,
            Err(e) => {
                log::error!("Failed to get READY: {}", e);
                false
            }
        }
    }

    fn set_line(&self, offset: Offset, high: bool, name: &str) {
        let value = if high { Value::Active } else { Value::Inactive };
        if let Err(e) = self.request.set_value(offset, value) {
            log::error!("Failed to set {}: {}", name, e);
        }
    }
}

impl SerialLines for LinuxGpioBus {
    fn set_cs(&mut self, active: bool) {
        // CS is active low
        self.set_line(self.cs, !active, "CS");
    }

    fn set_sck(&mut self, high: bool) {
        self.set_line(self.sck, high, "SCK");
    }

    fn set_mosi(&mut self, high: bool) {
        self.set_line(self.mosi, high, "MOSI");
    }

    fn get_miso(&self) -> bool {
        match self.request.value(self.miso) {
            Ok(Value::Active) => true,
            Ok(Value::Inactive) => false,
            Err(e) => {
                log::error!("Failed to get MISO: {}", e);
                false
            }
        }
    }
}

impl Timeline for LinuxGpioBus {
    fn delay_ns(&mut self, ns: u32) {
        if ns > 0 {
            std::thread::sleep(Duration::from_nanos(ns as u64));
        }
    }

    fn wait_clock_edge(&mut self) {
        std::thread::sleep(self.poll_interval);
    }
}

fn parse_offset(name: &'static str, value: &str) -> Result<Offset> {
    value
        .parse()
        .map_err(|_| LinuxGpioError::InvalidParameter(format!("{}={}", name, value)))
}

/// Parse backend options into a configuration
///
/// # Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path (or use gpiochip=N)
/// - `gpiochip=0` - GPIO chip number (alternative to dev)
/// - `cs`, `sck`, `mosi`, `miso`, `ready` - line offsets (required)
/// - `ready_active_low=1` - READY is asserted low
/// - `poll_ns=1000` - interval between ready polls
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioConfig> {
    let mut config = LinuxGpioConfig::default();
    let mut cs = None;
    let mut sck = None;
    let mut mosi = None;
    let mut miso = None;
    let mut ready = None;
    let mut gpiochip: Option<u32> = None;

    for &(key, value) in options {
        match key {
            "dev" => config.device = value.to_string(),
            "gpiochip" => gpiochip = Some(parse_offset("gpiochip", value)?),
            "cs" => cs = Some(parse_offset("cs", value)?),
            "sck" => sck = Some(parse_offset("sck", value)?),
            "mosi" => mosi = Some(parse_offset("mosi", value)?),
            "miso" => miso = Some(parse_offset("miso", value)?),
            "ready" => ready = Some(parse_offset("ready", value)?),
            "ready_active_low" => {
                config.ready_active_low = match value {
                    "1" | "true" | "yes" => true,
                    "0" | "false" | "no" => false,
                    _ => {
                        return Err(LinuxGpioError::InvalidParameter(format!(
                            "ready_active_low={}",
                            value
                        )))
                    }
                };
            }
            "poll_ns" => {
                config.poll_interval_ns = value.parse().map_err(|_| {
                    LinuxGpioError::InvalidParameter(format!("poll_ns={}", value))
                })?;
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    // Handle dev vs gpiochip
    if config.device.is_empty() {
        match gpiochip {
            Some(n) => config.device = format!("/dev/gpiochip{}", n),
            None => return Err(LinuxGpioError::NoDevice),
        }
    }

    config.cs = cs.ok_or(LinuxGpioError::MissingParameter("cs"))?;
    config.sck = sck.ok_or(LinuxGpioError::MissingParameter("sck"))?;
    config.mosi = mosi.ok_or(LinuxGpioError::MissingParameter("mosi"))?;
    config.miso = miso.ok_or(LinuxGpioError::MissingParameter("miso"))?;
    config.ready = ready.ok_or(LinuxGpioError::MissingParameter("ready"))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_full() {
        let config = parse_options(&[
            ("dev", "/dev/gpiochip1"),
            ("cs", "25"),
            ("sck", "11"),
            ("mosi", "10"),
            ("miso", "9"),
            ("ready", "8"),
            ("ready_active_low", "1"),
            ("poll_ns", "500"),
        ])
        .unwrap();

        assert_eq!(config.device, "/dev/gpiochip1");
        assert_eq!(
            (config.cs, config.sck, config.mosi, config.miso, config.ready),
            (25, 11, 10, 9, 8)
        );
        assert!(config.ready_active_low);
        assert_eq!(config.poll_interval_ns, 500);
    }

    #[test]
    fn test_parse_options_gpiochip_number() {
        let config = parse_options(&[
            ("gpiochip", "2"),
            ("cs", "1"),
            ("sck", "2"),
            ("mosi", "3"),
            ("miso", "4"),
            ("ready", "5"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/gpiochip2");
        assert_eq!(config.poll_interval_ns, DEFAULT_POLL_INTERVAL_NS);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(matches!(
            parse_options(&[("cs", "1")]),
            Err(LinuxGpioError::NoDevice)
        ));
        assert!(matches!(
            parse_options(&[("dev", "/dev/gpiochip0"), ("cs", "1"), ("sck", "2")]),
            Err(LinuxGpioError::MissingParameter("mosi"))
        ));
        assert!(matches!(
            parse_options(&[("dev", "/dev/gpiochip0"), ("cs", "x")]),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_duplicate_lines_rejected() {
        let config = LinuxGpioConfig::new("/dev/gpiochip0", 1, 2, 3, 3, 5);
        assert!(matches!(
            config.check_distinct_lines(),
            Err(LinuxGpioError::DuplicateLine {
                offset: 3,
                first: "mosi",
                second: "miso"
            })
        ));
        let config = LinuxGpioConfig::new("/dev/gpiochip0", 1, 2, 3, 4, 5);
        assert!(config.check_distinct_lines().is_ok());
    }
}
