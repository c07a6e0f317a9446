//! Virtual-time SPI bus

use crate::trace::{Signal, Trace};
use cordic_spi_core::spi::{SerialLines, Timeline};

/// Default system clock period in nanoseconds (100 MHz)
pub const DEFAULT_SYS_CLOCK_PERIOD_NS: u32 = 10;

/// Device attached to the far end of a [`SimBus`]
///
/// The bus reports chip-select and clock transitions as they happen; the
/// slave decides what MISO shows. `tick` is called on every rising edge of
/// the system clock, whether the master is delaying or polling.
pub trait SpiSlave {
    /// Chip select changed (`selected=true` means CS is low)
    fn select(&mut self, _selected: bool) {}

    /// SCK changed to `sck_high`; `mosi` is the MOSI level at that instant
    fn clock_edge(&mut self, sck_high: bool, mosi: bool);

    /// Current MISO level given the current MOSI level
    fn miso(&self, mosi: bool) -> bool;

    /// System clock rising edge
    fn tick(&mut self) {}
}

/// Slave that wires MISO straight to MOSI
#[derive(Debug, Clone, Copy, Default)]
pub struct Loopback;

impl SpiSlave for Loopback {
    fn clock_edge(&mut self, _sck_high: bool, _mosi: bool) {}

    fn miso(&self, mosi: bool) -> bool {
        mosi
    }
}

/// In-memory serial bus on a virtual clock
pub struct SimBus<S> {
    slave: S,
    cs_n: bool,
    sck: bool,
    mosi: bool,
    now_ns: u64,
    sys_clock_period_ns: u64,
    next_clock_edge_ns: u64,
    clock_edges: u64,
    trace: Option<Trace>,
}

impl<S: SpiSlave> SimBus<S> {
    /// Create a bus with CS high, SCK and MOSI low, at time zero
    pub fn new(slave: S) -> Self {
        let period = DEFAULT_SYS_CLOCK_PERIOD_NS as u64;
        Self {
            slave,
            cs_n: true,
            sck: false,
            mosi: false,
            now_ns: 0,
            sys_clock_period_ns: period,
            next_clock_edge_ns: period,
            clock_edges: 0,
            trace: None,
        }
    }

    /// Set the system clock period (clamped to at least 1 ns)
    pub fn with_sys_clock_period_ns(mut self, ns: u32) -> Self {
        let period = ns.max(1) as u64;
        self.sys_clock_period_ns = period;
        self.next_clock_edge_ns = (self.now_ns / period + 1) * period;
        self
    }

    /// Record every signal change from now on
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Trace::new());
        self
    }

    /// Current virtual time in nanoseconds
    pub fn now_ns(&self) -> u64 {
        self.now_ns
    }

    /// Number of system clock rising edges so far
    pub fn clock_edges(&self) -> u64 {
        self.clock_edges
    }

    /// Current SCK level
    pub fn sck(&self) -> bool {
        self.sck
    }

    /// Current MOSI level
    pub fn mosi(&self) -> bool {
        self.mosi
    }

    /// Whether CS is currently asserted (low)
    pub fn cs_active(&self) -> bool {
        !self.cs_n
    }

    /// Get a reference to the attached slave
    pub fn slave(&self) -> &S {
        &self.slave
    }

    /// Get a mutable reference to the attached slave
    pub fn slave_mut(&mut self) -> &mut S {
        &mut self.slave
    }

    /// Consume the bus and return the slave
    pub fn into_slave(self) -> S {
        self.slave
    }

    /// Recorded trace, if tracing is enabled
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Clear the recorded trace, if tracing is enabled
    pub fn clear_trace(&mut self) {
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
    }

    fn record(&mut self, signal: Signal, level: bool) {
        let now = self.now_ns;
        if let Some(trace) = self.trace.as_mut() {
            trace.push(now, signal, level);
        }
    }

    /// Move time forward, ticking the slave on every clock edge crossed
    fn advance_to(&mut self, target_ns: u64) {
        while self.next_clock_edge_ns <= target_ns {
            self.now_ns = self.next_clock_edge_ns;
            self.clock_edges += 1;
            self.slave.tick();
            self.next_clock_edge_ns += self.sys_clock_period_ns;
        }
        self.now_ns = target_ns;
    }
}

impl<S: SpiSlave> SerialLines for SimBus<S> {
    fn set_cs(&mut self, active: bool) {
        let level = !active;
        if level != self.cs_n {
            self.cs_n = level;
            self.record(Signal::CsN, level);
            self.slave.select(active);
        }
    }

    fn set_sck(&mut self, high: bool) {
        if high != self.sck {
            self.sck = high;
            self.record(Signal::Sck, high);
            self.slave.clock_edge(high, self.mosi);
        }
    }

    fn set_mosi(&mut self, high: bool) {
        if high != self.mosi {
            self.mosi = high;
            self.record(Signal::Mosi, high);
        }
    }

    fn get_miso(&self) -> bool {
        self.slave.miso(self.mosi)
    }
}

impl<S: SpiSlave> Timeline for SimBus<S> {
    fn delay_ns(&mut self, ns: u32) {
        let target = self.now_ns + ns as u64;
        self.advance_to(target);
    }

    fn wait_clock_edge(&mut self) {
        let target = self.next_clock_edge_ns;
        self.advance_to(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordic_spi_core::spi::{self, BitOrder, SpiMode, SpiTimingConfig};

    fn all_configs() -> Vec<SpiTimingConfig> {
        let mut configs = Vec::new();
        for mode in SpiMode::ALL {
            for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
                configs.push(SpiTimingConfig::new(mode).with_bit_order(order));
            }
        }
        configs
    }

    /// MISO follows the last SCK level the slave saw
    #[derive(Default)]
    struct ClockEcho {
        sck: bool,
    }

    impl SpiSlave for ClockEcho {
        fn clock_edge(&mut self, sck_high: bool, _mosi: bool) {
            self.sck = sck_high;
        }

        fn miso(&self, _mosi: bool) -> bool {
            self.sck
        }
    }

    #[test]
    fn test_loopback_every_byte_every_mode() {
        for cfg in all_configs() {
            let mut bus = SimBus::new(Loopback);
            for tx in 0..=255u8 {
                let rx = spi::transfer_byte(&mut bus, &cfg, tx);
                assert_eq!(rx, tx, "{:?} {:?}", cfg.mode(), cfg.bit_order);
            }
        }
    }

    #[test]
    fn test_transfer_lasts_27_half_periods() {
        for cfg in all_configs() {
            let cfg = cfg.with_half_period_ns(50).with_settle_ns(3);
            let mut bus = SimBus::new(Loopback);
            spi::transfer_byte(&mut bus, &cfg, 0x3C);
            assert_eq!(bus.now_ns(), 27 * 50);
            spi::transfer_byte(&mut bus, &cfg, 0xC3);
            assert_eq!(bus.now_ns(), 2 * 27 * 50);
        }
    }

    #[test]
    fn test_sample_edge_matches_mode_table() {
        // Rising sample edge leaves SCK high at the sample instant
        let expected = [
            (SpiMode::Mode0, 0xFF),
            (SpiMode::Mode1, 0x00),
            (SpiMode::Mode2, 0x00),
            (SpiMode::Mode3, 0xFF),
        ];
        for (mode, rx) in expected {
            let cfg = SpiTimingConfig::new(mode);
            let mut bus = SimBus::new(ClockEcho::default());
            assert_eq!(spi::transfer_byte(&mut bus, &cfg, 0x00), rx, "{:?}", mode);
        }
    }

    #[test]
    fn test_sck_edges_inside_pulse() {
        for cfg in all_configs() {
            let mut bus = SimBus::new(Loopback).with_trace();
            spi::transfer_byte(&mut bus, &cfg, 0xA5);

            let trace = bus.trace().unwrap();
            let pulses = trace.cs_pulses();
            assert_eq!(pulses.len(), 1);
            let (start, end) = pulses[0];
            assert_eq!(trace.edges_between(Signal::Sck, start, end).count(), 16);
            assert_eq!(bus.sck(), cfg.clock_idle_level());
            assert!(!bus.cs_active());
        }
    }

    #[test]
    fn test_mosi_changes_on_correct_edge() {
        for cfg in all_configs() {
            let idle = cfg.clock_idle_level();
            let mut bus = SimBus::new(Loopback).with_trace();
            spi::transfer_byte(&mut bus, &cfg, 0x55);

            let trace = bus.trace().unwrap();
            let (start, end) = trace.cs_pulses()[0];
            let sck: Vec<_> = trace.edges_between(Signal::Sck, start, end).collect();
            let mosi: Vec<_> = trace.edges_between(Signal::Mosi, start, end).collect();
            assert!(mosi.len() >= 7);

            for m in mosi {
                let last_sck = sck.iter().filter(|e| e.time_ns <= m.time_ns).last();
                if cfg.samples_on_leading_edge() {
                    // Data set up while SCK is idle, half a period before the edge
                    if let Some(e) = last_sck {
                        assert_eq!(e.level, idle);
                        assert!(e.time_ns < m.time_ns);
                    }
                } else {
                    // Data changes together with the leading edge
                    let e = last_sck.unwrap();
                    assert_eq!(e.level, !idle);
                    assert_eq!(e.time_ns, m.time_ns);
                }
            }
        }
    }

    #[test]
    fn test_write_bytes_one_pulse_per_byte() {
        let half = 20u64;
        for cfg in all_configs() {
            let mut bus = SimBus::new(Loopback).with_trace();
            let data = [0xb8, 0x09, 0x00, 0x00, 0x44, 0x32, 0x91, 0x0c];
            spi::write_bytes(&mut bus, &cfg, &data);

            let pulses = bus.trace().unwrap().cs_pulses();
            assert_eq!(pulses.len(), data.len());

            // Idle half-period before the first assertion
            assert_eq!(pulses[0].0, half);
            for (i, &(assert_at, release_at)) in pulses.iter().enumerate() {
                // CS setup + 8 bits of 3 half-periods each
                assert_eq!(release_at - assert_at, 25 * half);
                if let Some(&(next_assert, _)) = pulses.get(i + 1) {
                    // Hold after release, then idle before the next assertion
                    assert_eq!(next_assert - release_at, 2 * half);
                }
            }
            // Hold after the last release
            assert_eq!(bus.now_ns(), pulses[7].1 + half);
        }
    }

    #[test]
    fn test_read_bytes_sends_filler() {
        let cfg = SpiTimingConfig::default();
        let mut bus = SimBus::new(Loopback).with_trace();
        let mut buf = [0xFFu8; 6];
        spi::read_bytes(&mut bus, &cfg, &mut buf);

        assert_eq!(buf, [spi::FILLER_BYTE; 6]);
        let trace = bus.trace().unwrap();
        assert_eq!(trace.edge_count(Signal::Mosi), 0);
        assert_eq!(trace.cs_pulses().len(), 6);
    }

    #[test]
    fn test_clock_edges_follow_virtual_time() {
        let mut bus = SimBus::new(Loopback).with_sys_clock_period_ns(10);
        bus.delay_ns(35);
        assert_eq!(bus.clock_edges(), 3);
        bus.wait_clock_edge();
        assert_eq!(bus.now_ns(), 40);
        assert_eq!(bus.clock_edges(), 4);
        bus.wait_clock_edge();
        assert_eq!(bus.now_ns(), 50);
    }
}
