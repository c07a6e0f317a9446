//! Backend registration and dispatch
//!
//! This module provides a centralized registry for all backends, with
//! support for feature-gated inclusion and dynamic help text generation.
//! Backends are selected with a string of the form `name:key=value,...`.

use cordic_spi_core::spi::{SerialLines, SpiTimingConfig, Timeline};

/// A serial bus that can also report the unit's ready signal
///
/// Every backend is opened as one of these so the commands can stay
/// backend-agnostic.
pub trait ExchangeBus: SerialLines + Timeline {
    /// Current level of the unit's ready output
    fn device_ready(&mut self) -> bool;
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "sim")]
    backends.push(BackendInfo {
        name: "sim",
        aliases: &["dummy"],
        description: "Virtual-time device model (latency=<cycles>,clock_ns=<ns>,response=<12 hex digits>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio"],
        description: "Linux GPIO bitbang (dev=/dev/gpiochipN,cs=,sck=,mosi=,miso=,ready=)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Resolve a name or alias to the primary backend name
pub fn find_backend(name: &str) -> Option<&'static str> {
    available_backends()
        .into_iter()
        .find(|b| b.name == name || b.aliases.contains(&name))
        .map(|b| b.name)
}

/// Parsed backend string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendParams {
    /// Backend name as given
    pub name: String,
    /// Options in the order given
    pub options: Vec<(String, String)>,
}

impl BackendParams {
    /// Options as borrowed pairs, the form backend parsers take
    pub fn option_pairs(&self) -> Vec<(&str, &str)> {
        self.options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a backend string like `sim:latency=40,clock_ns=10`
pub fn parse_backend_params(s: &str) -> Result<BackendParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut options = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                options.push((key.to_string(), value.to_string()));
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        options,
    })
}

/// Open a backend
///
/// The timing configuration is needed by backends that model the device,
/// so it speaks the same SPI mode as the master.
pub fn open_backend(
    backend: &str,
    #[allow(unused_variables)] timing: &SpiTimingConfig,
) -> Result<Box<dyn ExchangeBus>, Box<dyn std::error::Error>> {
    let params = parse_backend_params(backend)?;
    let name = find_backend(&params.name).ok_or_else(|| {
        format!(
            "Unknown backend '{}' [available: {}]",
            params.name,
            backend_names_short()
        )
    })?;

    match name {
        #[cfg(feature = "sim")]
        "sim" => sim::open(&params.option_pairs(), timing),
        #[cfg(feature = "linux-gpio")]
        "linux_gpio" => linux_gpio::open(&params.option_pairs()),
        _ => Err(format!("Backend '{}' is not available in this build", name).into()),
    }
}

#[cfg(feature = "sim")]
pub mod sim {
    //! Simulated unit

    use super::ExchangeBus;
    use cordic_spi_core::frame::{InputFrame, OutputFrame};
    use cordic_spi_core::spi::SpiTimingConfig;
    use cordic_spi_sim::{CordicDevice, SimBus, DEFAULT_SYS_CLOCK_PERIOD_NS};

    /// Default computation latency in system clock cycles
    pub const DEFAULT_LATENCY_CYCLES: u32 = 64;

    type BoxedResponder = Box<dyn FnMut(&InputFrame) -> OutputFrame>;

    /// Options for the simulated backend
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SimOptions {
        /// Cycles between the last input bit and ready
        pub latency_cycles: u32,
        /// System clock period in nanoseconds
        pub clock_ns: u32,
        /// Fixed response; `None` answers with (alpha, x, y)
        pub response: Option<OutputFrame>,
    }

    impl Default for SimOptions {
        fn default() -> Self {
            Self {
                latency_cycles: DEFAULT_LATENCY_CYCLES,
                clock_ns: DEFAULT_SYS_CLOCK_PERIOD_NS,
                response: None,
            }
        }
    }

    impl ExchangeBus for SimBus<CordicDevice<BoxedResponder>> {
        fn device_ready(&mut self) -> bool {
            self.slave().ready()
        }
    }

    fn parse_response(value: &str) -> Result<OutputFrame, String> {
        let bytes = crate::commands::codec::parse_hex_bytes(&[value])?;
        OutputFrame::decode(&bytes).map_err(|e| format!("Invalid response '{}': {}", value, e))
    }

    /// Parse simulated backend options
    pub fn parse_options(options: &[(&str, &str)]) -> Result<SimOptions, String> {
        let mut opts = SimOptions::default();
        for &(key, value) in options {
            match key {
                "latency" => {
                    opts.latency_cycles = value
                        .parse()
                        .map_err(|_| format!("Invalid latency value: {}", value))?;
                }
                "clock_ns" => {
                    opts.clock_ns = value
                        .parse()
                        .map_err(|_| format!("Invalid clock_ns value: {}", value))?;
                    if opts.clock_ns == 0 {
                        return Err("clock_ns must be non-zero".to_string());
                    }
                }
                "response" => opts.response = Some(parse_response(value)?),
                _ => {
                    log::warn!("sim: Unknown option: {}={}", key, value);
                }
            }
        }
        Ok(opts)
    }

    /// Open the simulated backend
    pub fn open(
        options: &[(&str, &str)],
        timing: &SpiTimingConfig,
    ) -> Result<Box<dyn ExchangeBus>, Box<dyn std::error::Error>> {
        let opts = parse_options(options)?;
        let responder: BoxedResponder = match opts.response {
            Some(fixed) => Box::new(move |_: &InputFrame| fixed),
            None => Box::new(|input: &InputFrame| {
                OutputFrame::new(input.alpha, input.x, input.y)
            }),
        };

        log::info!(
            "sim: mode {} {:?}, latency {} cycles, clock {} ns",
            timing.mode().number(),
            timing.bit_order,
            opts.latency_cycles,
            opts.clock_ns
        );

        let device = CordicDevice::new(timing, opts.latency_cycles, responder);
        let bus = SimBus::new(device).with_sys_clock_period_ns(opts.clock_ns);
        Ok(Box::new(bus))
    }
}

#[cfg(feature = "linux-gpio")]
pub mod linux_gpio {
    //! Linux GPIO bitbang

    use super::ExchangeBus;
    use cordic_spi_linux_gpio::LinuxGpioBus;

    impl ExchangeBus for LinuxGpioBus {
        fn device_ready(&mut self) -> bool {
            self.is_ready()
        }
    }

    /// Open the Linux GPIO backend
    pub fn open(
        options: &[(&str, &str)],
    ) -> Result<Box<dyn ExchangeBus>, Box<dyn std::error::Error>> {
        let config = cordic_spi_linux_gpio::parse_options(options)?;
        let bus = LinuxGpioBus::open(&config)?;
        Ok(Box::new(bus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_params() {
        let params = parse_backend_params("sim:latency=40,clock_ns=5").unwrap();
        assert_eq!(params.name, "sim");
        assert_eq!(
            params.option_pairs(),
            vec![("latency", "40"), ("clock_ns", "5")]
        );

        let params = parse_backend_params("sim").unwrap();
        assert!(params.options.is_empty());

        assert!(parse_backend_params("sim:latency").is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let timing = SpiTimingConfig::default();
        assert!(open_backend("nonexistent", &timing).is_err());
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_sim_aliases_and_options() {
        use cordic_spi_core::frame::OutputFrame;

        assert_eq!(find_backend("dummy"), Some("sim"));

        let opts = sim::parse_options(&[
            ("latency", "12"),
            ("clock_ns", "20"),
            ("response", "4432aabbccdd"),
        ])
        .unwrap();
        assert_eq!(opts.latency_cycles, 12);
        assert_eq!(opts.clock_ns, 20);
        assert_eq!(opts.response, Some(OutputFrame::new(0x3244, 0xBBAA, 0xDDCC)));

        assert!(sim::parse_options(&[("latency", "soon")]).is_err());
        assert!(sim::parse_options(&[("clock_ns", "0")]).is_err());
        assert!(sim::parse_options(&[("response", "4432")]).is_err());
    }
}
