//! Behavioral model of the CORDIC unit's serial front end
//!
//! The model does not compute anything itself: a [`Responder`] turns each
//! received [`InputFrame`] into an [`OutputFrame`]. What it does reproduce
//! is the wire behaviour:
//!
//! - each chip-select pulse carries one byte, shifted in the master's mode
//! - after 8 bytes the frame is latched and the device starts computing
//! - `ready` rises after a fixed number of system-clock cycles
//! - the next 6 pulses shift out the response, then `ready` falls again

use crate::bus::SpiSlave;
use cordic_spi_core::frame::{InputFrame, OutputFrame, INPUT_FRAME_LEN, OUTPUT_FRAME_LEN};
use cordic_spi_core::spi::{ClockPhase, SpiTimingConfig};

/// Produces the device's answer for an input frame
pub trait Responder {
    /// Compute the output frame for `input`
    fn respond(&mut self, input: &InputFrame) -> OutputFrame;
}

impl<F> Responder for F
where
    F: FnMut(&InputFrame) -> OutputFrame,
{
    fn respond(&mut self, input: &InputFrame) -> OutputFrame {
        self(input)
    }
}

/// Slave-side shift register for one byte
///
/// Samples MOSI on the master's sample edge and presents the next MISO bit
/// on the shift edge. In CPHA=0 the first bit is presented as soon as the
/// byte begins, since there is no shift edge before the first sample.
#[derive(Debug, Clone)]
pub struct ShiftRegister {
    idle: bool,
    phase: ClockPhase,
    order: [u8; 8],
    tx: u8,
    rx: u8,
    sampled: usize,
    shifted: usize,
    miso: bool,
}

impl ShiftRegister {
    /// Create a shift register matching the master's mode and bit order
    pub fn new(config: &SpiTimingConfig) -> Self {
        Self {
            idle: config.clock_idle_level(),
            phase: config.phase,
            order: config.bit_order.positions(),
            tx: 0,
            rx: 0,
            sampled: 0,
            shifted: 0,
            miso: false,
        }
    }

    /// Start a new byte that will shift out `tx`
    pub fn begin(&mut self, tx: u8) {
        self.tx = tx;
        self.rx = 0;
        self.sampled = 0;
        self.shifted = 0;
        self.miso = false;
        if self.phase == ClockPhase::CaptureOnFirstTransition {
            self.shift_out();
        }
    }

    fn shift_out(&mut self) {
        if let Some(&pos) = self.order.get(self.shifted) {
            self.miso = (self.tx >> pos) & 1 != 0;
            self.shifted += 1;
        }
    }

    /// Handle an SCK transition; returns the byte once its 8th bit is sampled
    pub fn edge(&mut self, sck_high: bool, mosi: bool) -> Option<u8> {
        let leading = sck_high != self.idle;
        let sample = match self.phase {
            ClockPhase::CaptureOnFirstTransition => leading,
            ClockPhase::CaptureOnSecondTransition => !leading,
        };

        if !sample {
            self.shift_out();
            return None;
        }

        let &pos = self.order.get(self.sampled)?;
        if mosi {
            self.rx |= 1 << pos;
        }
        self.sampled += 1;
        (self.sampled == 8).then_some(self.rx)
    }

    /// Current MISO level
    pub fn miso(&self) -> bool {
        self.miso
    }

    /// Whether all 8 bits have been sampled
    pub fn is_complete(&self) -> bool {
        self.sampled == 8
    }
}

/// Where the device is in its frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Collecting input bytes
    Receiving {
        /// Bytes received so far
        count: usize,
    },
    /// Frame latched, waiting out the computation latency
    Computing {
        /// System clock cycles until ready
        remaining: u32,
    },
    /// Ready asserted, serving the response
    Ready {
        /// Response bytes already shifted out
        sent: usize,
    },
}

/// CORDIC unit model
pub struct CordicDevice<R> {
    responder: R,
    latency_cycles: u32,
    shifter: ShiftRegister,
    selected: bool,
    state: DeviceState,
    rx_buf: [u8; INPUT_FRAME_LEN],
    response: [u8; OUTPUT_FRAME_LEN],
    last_input: Option<InputFrame>,
    frames_completed: u32,
}

impl<R: Responder> CordicDevice<R> {
    /// Create a device speaking the given SPI mode
    ///
    /// `latency_cycles` is the number of system clock edges between the
    /// last input bit and `ready` rising (at least one).
    pub fn new(config: &SpiTimingConfig, latency_cycles: u32, responder: R) -> Self {
        Self {
            responder,
            latency_cycles: latency_cycles.max(1),
            shifter: ShiftRegister::new(config),
            selected: false,
            state: DeviceState::Receiving { count: 0 },
            rx_buf: [0; INPUT_FRAME_LEN],
            response: [0; OUTPUT_FRAME_LEN],
            last_input: None,
            frames_completed: 0,
        }
    }

    /// The ready output
    pub fn ready(&self) -> bool {
        matches!(self.state, DeviceState::Ready { .. })
    }

    /// Current state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Most recent input frame latched by the device
    pub fn last_input(&self) -> Option<InputFrame> {
        self.last_input
    }

    /// Number of frames whose response has been fully read out
    pub fn frames_completed(&self) -> u32 {
        self.frames_completed
    }

    fn on_byte(&mut self, byte: u8) {
        match self.state {
            DeviceState::Receiving { count } => {
                self.rx_buf[count] = byte;
                let count = count + 1;
                if count < INPUT_FRAME_LEN {
                    self.state = DeviceState::Receiving { count };
                    return;
                }

                let input = InputFrame::from_packed(u64::from_le_bytes(self.rx_buf));
                self.response = self.responder.respond(&input).encode();
                self.last_input = Some(input);
                self.state = DeviceState::Computing {
                    remaining: self.latency_cycles,
                };
                log::debug!("cordic_sim: latched frame {:02x?}", self.rx_buf);
            }
            DeviceState::Computing { .. } => {
                log::warn!("cordic_sim: byte 0x{:02x} ignored while computing", byte);
            }
            // Filler bytes during readout
            DeviceState::Ready { .. } => {}
        }
    }
}

impl<R: Responder> SpiSlave for CordicDevice<R> {
    fn select(&mut self, selected: bool) {
        if selected {
            let out = match self.state {
                DeviceState::Ready { sent } => self.response[sent],
                _ => 0,
            };
            self.shifter.begin(out);
        } else if let DeviceState::Ready { sent } = self.state {
            if self.selected && self.shifter.is_complete() {
                let sent = sent + 1;
                if sent < OUTPUT_FRAME_LEN {
                    self.state = DeviceState::Ready { sent };
                } else {
                    self.state = DeviceState::Receiving { count: 0 };
                    self.frames_completed += 1;
                    log::debug!("cordic_sim: response sent, ready deasserted");
                }
            }
        }
        self.selected = selected;
    }

    fn clock_edge(&mut self, sck_high: bool, mosi: bool) {
        if !self.selected {
            return;
        }
        if let Some(byte) = self.shifter.edge(sck_high, mosi) {
            self.on_byte(byte);
        }
    }

    fn miso(&self, _mosi: bool) -> bool {
        self.selected && self.shifter.miso()
    }

    fn tick(&mut self) {
        if let DeviceState::Computing { remaining } = self.state {
            if remaining <= 1 {
                self.state = DeviceState::Ready { sent: 0 };
                log::debug!("cordic_sim: ready asserted");
            } else {
                self.state = DeviceState::Computing {
                    remaining: remaining - 1,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Loopback, SimBus};
    use crate::trace::Signal;
    use cordic_spi_core::exchange::{run_exchange, wait_ready, DEFAULT_MAX_POLL_CYCLES};
    use cordic_spi_core::spi::{BitOrder, SpiMode};
    use cordic_spi_core::Error;

    const INPUT: InputFrame = InputFrame::new(0x09b8, 0x0000, 0x3244, 0x0c91);

    fn all_configs() -> Vec<SpiTimingConfig> {
        let mut configs = Vec::new();
        for mode in SpiMode::ALL {
            for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
                configs.push(SpiTimingConfig::new(mode).with_bit_order(order));
            }
        }
        configs
    }

    fn fixed(_: &InputFrame) -> OutputFrame {
        OutputFrame::new(0x3244, 0xBBAA, 0xDDCC)
    }

    #[test]
    fn test_reference_exchange() {
        for cfg in all_configs() {
            let device = CordicDevice::new(&cfg, 200, fixed);
            let mut bus = SimBus::new(device).with_trace();

            let out = run_exchange(
                &mut bus,
                &cfg,
                &INPUT,
                |b: &mut SimBus<_>| b.slave().ready(),
                DEFAULT_MAX_POLL_CYCLES,
            )
            .unwrap();

            assert_eq!(out.alpha, 0x3244, "{:?} {:?}", cfg.mode(), cfg.bit_order);
            assert_eq!(out.cos, 0xBBAA);
            assert_eq!(out.sin, 0xDDCC);

            let device = bus.slave();
            assert_eq!(device.last_input(), Some(INPUT));
            assert_eq!(device.frames_completed(), 1);
            assert!(!device.ready());
            assert_eq!(bus.trace().unwrap().cs_pulses().len(), 8 + 6);
        }
    }

    #[test]
    fn test_device_sees_lsb_first_bytes() {
        let cfg = SpiTimingConfig::default();
        let device = CordicDevice::new(&cfg, 1, fixed);
        let mut bus = SimBus::new(device);
        cordic_spi_core::spi::write_bytes(&mut bus, &cfg, &INPUT.encode());

        assert_eq!(bus.slave().last_input(), Some(INPUT));
        assert_eq!(INPUT.pack(), 0x0c91_3244_0000_09b8);
    }

    #[test]
    fn test_timeout_polls_exactly_k_times() {
        let cfg = SpiTimingConfig::default();
        let mut bus = SimBus::new(Loopback).with_trace();
        let mut polls = 0u32;

        let result = run_exchange(
            &mut bus,
            &cfg,
            &INPUT,
            |_: &mut SimBus<Loopback>| {
                polls += 1;
                false
            },
            25,
        );

        assert_eq!(result, Err(Error::ReadyTimeout { polls: 25 }));
        assert_eq!(polls, 25);
        // Write phase only, no read-phase pulses
        assert_eq!(bus.trace().unwrap().cs_pulses().len(), 8);
    }

    #[test]
    fn test_slow_device_times_out() {
        let cfg = SpiTimingConfig::default();
        let device = CordicDevice::new(&cfg, 5_000, fixed);
        let mut bus = SimBus::new(device).with_trace();

        let result = run_exchange(
            &mut bus,
            &cfg,
            &INPUT,
            |b: &mut SimBus<_>| b.slave().ready(),
            100,
        );

        assert_eq!(result, Err(Error::ReadyTimeout { polls: 100 }));
        assert!(matches!(
            bus.slave().state(),
            DeviceState::Computing { .. }
        ));
        assert_eq!(bus.trace().unwrap().cs_pulses().len(), 8);
    }

    #[test]
    fn test_wait_ready_counts_cycles() {
        let mut bus = SimBus::new(Loopback);
        let cycles = wait_ready(&mut bus, |b: &mut SimBus<Loopback>| b.clock_edges() >= 5, 10);
        assert_eq!(cycles, Ok(5));
        assert_eq!(bus.now_ns(), 50);
    }

    #[test]
    fn test_wait_ready_zero_bound() {
        let mut bus = SimBus::new(Loopback);
        let result = wait_ready(&mut bus, |_: &mut SimBus<Loopback>| true, 0);
        assert_eq!(result, Err(Error::ReadyTimeout { polls: 0 }));
        assert_eq!(bus.clock_edges(), 0);
    }

    #[test]
    fn test_ready_latency() {
        let cfg = SpiTimingConfig::default();
        let device = CordicDevice::new(&cfg, 300, fixed);
        let mut bus = SimBus::new(device);
        cordic_spi_core::spi::write_bytes(&mut bus, &cfg, &INPUT.encode());
        assert!(!bus.slave().ready());

        let cycles = wait_ready(&mut bus, |b: &mut SimBus<_>| b.slave().ready(), 1_000).unwrap();
        // Part of the latency elapses during the final CS hold
        assert!(cycles <= 300);
        assert!(cycles >= 290);
    }

    #[test]
    fn test_back_to_back_exchanges() {
        let swap = |i: &InputFrame| OutputFrame::new(i.alpha, i.x, i.y);
        for cfg in all_configs() {
            let device = CordicDevice::new(&cfg, 16, swap);
            let mut bus = SimBus::new(device);
            let second = InputFrame::new(0x1111, 0x2222, 0x3333, 0x4444);

            for input in [INPUT, second] {
                let out = run_exchange(
                    &mut bus,
                    &cfg,
                    &input,
                    |b: &mut SimBus<_>| b.slave().ready(),
                    1_000,
                )
                .unwrap();
                assert_eq!(out, OutputFrame::new(input.alpha, input.x, input.y));
            }
            assert_eq!(bus.slave().frames_completed(), 2);
        }
    }

    #[test]
    fn test_device_miso_idle_when_deselected() {
        let cfg = SpiTimingConfig::new(SpiMode::Mode3);
        let device = CordicDevice::new(&cfg, 1, fixed);
        let bus = SimBus::new(device).with_trace();
        assert!(!cordic_spi_core::spi::SerialLines::get_miso(&bus));
        assert_eq!(bus.trace().unwrap().edge_count(Signal::Sck), 0);
    }
}
