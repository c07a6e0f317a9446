//! Signal trace recording
//!
//! Records every level change the master makes, stamped with virtual time.
//! CS is recorded at its electrical level (low = asserted).

/// Signals driven by the master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Chip select, active low
    CsN,
    /// Serial clock
    Sck,
    /// Master out, slave in
    Mosi,
}

/// One level change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Virtual time of the change in nanoseconds
    pub time_ns: u64,
    /// Which signal changed
    pub signal: Signal,
    /// New level
    pub level: bool,
}

/// Ordered list of level changes
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    /// Create an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, time_ns: u64, signal: Signal, level: bool) {
        self.events.push(TraceEvent {
            time_ns,
            signal,
            level,
        });
    }

    /// All recorded events in order
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Events for one signal
    pub fn edges(&self, signal: Signal) -> impl Iterator<Item = &TraceEvent> + '_ {
        self.events.iter().filter(move |e| e.signal == signal)
    }

    /// Number of level changes on one signal
    pub fn edge_count(&self, signal: Signal) -> usize {
        self.edges(signal).count()
    }

    /// Chip-select pulses as (assert time, deassert time) pairs
    ///
    /// A pulse that was asserted but never released is not included.
    pub fn cs_pulses(&self) -> Vec<(u64, u64)> {
        let mut pulses = Vec::new();
        let mut asserted_at = None;
        for e in self.edges(Signal::CsN) {
            match (e.level, asserted_at) {
                (false, None) => asserted_at = Some(e.time_ns),
                (true, Some(start)) => {
                    pulses.push((start, e.time_ns));
                    asserted_at = None;
                }
                _ => {}
            }
        }
        pulses
    }

    /// Changes on `signal` strictly inside the window `(start, end)`
    pub fn edges_between(
        &self,
        signal: Signal,
        start: u64,
        end: u64,
    ) -> impl Iterator<Item = &TraceEvent> + '_ {
        self.edges(signal)
            .filter(move |e| e.time_ns > start && e.time_ns < end)
    }

    /// Forget all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
