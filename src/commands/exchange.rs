//! Exchange and sweep commands

use cordic_spi_core::exchange::run_exchange;
use cordic_spi_core::frame::{InputFrame, OutputFrame};
use indicatif::{ProgressBar, ProgressStyle};

use super::codec::{format_bytes, print_output};
use crate::backends::{self, ExchangeBus};
use crate::config::Settings;

/// Run one exchange on an already opened bus
pub fn exchange_once<B: ExchangeBus + ?Sized>(
    bus: &mut B,
    settings: &Settings,
    input: &InputFrame,
) -> cordic_spi_core::Result<OutputFrame> {
    run_exchange(
        bus,
        &settings.timing,
        input,
        |b: &mut B| b.device_ready(),
        settings.max_poll_cycles,
    )
}

fn describe_timing(settings: &Settings) {
    log::info!(
        "SPI mode {} {:?}, SCK period {} ns, settle {} ns, max poll {} cycles",
        settings.timing.mode().number(),
        settings.timing.bit_order,
        settings.timing.period_ns(),
        settings.timing.settle_ns,
        settings.max_poll_cycles
    );
}

/// Run a single exchange and print the result
pub fn run(settings: &Settings, input: &InputFrame) -> Result<(), Box<dyn std::error::Error>> {
    let mut bus = backends::open_backend(&settings.backend, &settings.timing)?;
    describe_timing(settings);

    println!("TX bytes (LSB first): {}", format_bytes(&input.encode()));
    let out = exchange_once(bus.as_mut(), settings, input)?;
    println!("RX bytes: {}", format_bytes(&out.encode()));
    print_output(&out);
    Ok(())
}

/// Angles visited by a sweep, `end` inclusive
pub fn sweep_angles(start: u32, end: u32, step: u32) -> Result<Vec<u32>, String> {
    if step == 0 {
        return Err("Sweep step must be non-zero".to_string());
    }
    if start > end {
        return Err(format!(
            "Sweep start 0x{:x} is past end 0x{:x}",
            start, end
        ));
    }
    Ok((start..=end).step_by(step as usize).collect())
}

/// Exchange one frame per angle, keeping the other operands fixed
pub fn run_sweep(
    settings: &Settings,
    base: &InputFrame,
    start: u32,
    end: u32,
    step: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let angles = sweep_angles(start, end, step)?;
    let mut bus = backends::open_backend(&settings.backend, &settings.timing)?;
    describe_timing(settings);

    let pb = ProgressBar::new(angles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} exchanges ({eta})")?
            .progress_chars("#>-"),
    );

    let mut results = Vec::with_capacity(angles.len());
    for &angle in &angles {
        let input = InputFrame::from_words_truncating(
            base.x.into(),
            base.y.into(),
            angle,
            base.atan0.into(),
        );
        let out = exchange_once(bus.as_mut(), settings, &input)?;
        results.push((input.alpha, out));
        pb.inc(1);
    }
    pb.finish_with_message("Sweep complete");

    println!("{:>8} {:>8} {:>8} {:>8}", "angle", "alpha", "cos", "sin");
    for (angle, out) in &results {
        println!(
            "  0x{:04x}   0x{:04x}   0x{:04x}   0x{:04x}",
            angle, out.alpha, out.cos, out.sin
        );
    }
    Ok(())
}

#[cfg(all(test, feature = "sim"))]
mod tests {
    use super::*;
    use cordic_spi_core::spi::{BitOrder, SpiMode, SpiTimingConfig};
    use cordic_spi_core::Error;

    fn settings(backend: &str, timing: SpiTimingConfig, max_poll_cycles: u32) -> Settings {
        Settings {
            backend: backend.to_string(),
            timing,
            max_poll_cycles,
        }
    }

    const REFERENCE: InputFrame = InputFrame::new(0x09b8, 0x0000, 0x3244, 0x0c91);

    #[test]
    fn test_fixed_response_through_registry() {
        for mode in SpiMode::ALL {
            for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
                let timing = SpiTimingConfig::new(mode).with_bit_order(order);
                let s = settings("sim:latency=10,response=4432aabbccdd", timing, 10_000);
                let mut bus = backends::open_backend(&s.backend, &s.timing).unwrap();
                let out = exchange_once(bus.as_mut(), &s, &REFERENCE).unwrap();
                assert_eq!(out, OutputFrame::new(0x3244, 0xBBAA, 0xDDCC));
            }
        }
    }

    #[test]
    fn test_default_responder_echoes_operands() {
        let s = settings("sim", SpiTimingConfig::default(), 10_000);
        let mut bus = backends::open_backend(&s.backend, &s.timing).unwrap();
        let out = exchange_once(bus.as_mut(), &s, &REFERENCE).unwrap();
        assert_eq!(out, OutputFrame::new(0x3244, 0x09b8, 0x0000));
    }

    #[test]
    fn test_timeout_reported() {
        let s = settings("sim:latency=500", SpiTimingConfig::default(), 100);
        let mut bus = backends::open_backend(&s.backend, &s.timing).unwrap();
        let err = exchange_once(bus.as_mut(), &s, &REFERENCE).unwrap_err();
        assert_eq!(err, Error::ReadyTimeout { polls: 100 });
    }

    #[test]
    fn test_sweep_angles() {
        assert_eq!(sweep_angles(0, 10, 4).unwrap(), vec![0, 4, 8]);
        assert_eq!(sweep_angles(0, 8, 4).unwrap(), vec![0, 4, 8]);
        assert_eq!(sweep_angles(5, 5, 1).unwrap(), vec![5]);
        assert!(sweep_angles(0, 10, 0).is_err());
        assert!(sweep_angles(10, 0, 1).is_err());
    }

    #[test]
    fn test_sweep_runs_against_sim() {
        let s = settings("sim:latency=4", SpiTimingConfig::default(), 1_000);
        assert!(run_sweep(&s, &REFERENCE, 0, 0x0800, 0x0400).is_ok());
    }
}
