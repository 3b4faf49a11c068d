// Live replay: one record per tick, running tallies, cyclic wrap.
//
// The `Aggregator` is an ordinary value owned by whoever drives the ticks.
// It holds no clock of its own; `ReplayDriver` pairs it with a sleep-based
// timer for the command line, while tests call `Aggregator::tick` directly.
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::engine::Engine;
use crate::snapshot::{self, Snapshot};
use crate::tally::Tally;
use crate::types::{CauseCategory, OutageRecord};

/// What a single tick saw and derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEvent {
    /// Cursor value when the tick ran; 0-based within the current cycle.
    pub step: usize,
    pub location_raw: String,
    pub location_canonical: String,
    pub time_start_raw: String,
    pub time_end_raw: String,
    /// Display only; replay does not sum durations.
    pub duration_hours: Option<f64>,
    pub causes: Vec<CauseCategory>,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    cursor: usize,
    cycle: usize,
    cause_counts: Tally<CauseCategory>,
    location_counts: Tally<String>,
    latest: Option<ProcessedEvent>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of completed wraps.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn cause_counts(&self) -> &Tally<CauseCategory> {
        &self.cause_counts
    }

    pub fn location_counts(&self) -> &Tally<String> {
        &self.location_counts
    }

    pub fn latest(&self) -> Option<&ProcessedEvent> {
        self.latest.as_ref()
    }

    /// Process the record at the cursor and advance.
    ///
    /// When the cursor has run past the end, the tallies are reset and the
    /// replay starts over from the first record before processing. An empty
    /// dataset makes every tick a no-op.
    pub fn tick(&mut self, records: &[OutageRecord], engine: &Engine) -> Option<&ProcessedEvent> {
        if records.is_empty() {
            return None;
        }
        if self.cursor >= records.len() {
            self.wrap();
        }

        let step = self.cursor;
        let record = &records[step];
        let normalized = engine.normalize(record);

        for cause in &normalized.causes {
            self.cause_counts.add(*cause);
        }
        self.location_counts.add(normalized.location_canonical.clone());
        self.cursor += 1;

        self.latest = Some(ProcessedEvent {
            step,
            location_raw: record.location_raw.clone(),
            location_canonical: normalized.location_canonical,
            time_start_raw: record.time_start_raw.clone(),
            time_end_raw: record.time_end_raw.clone(),
            duration_hours: normalized.duration_hours,
            causes: normalized.causes,
        });
        self.latest.as_ref()
    }

    fn wrap(&mut self) {
        debug!(
            cycle = self.cycle,
            processed = self.cursor,
            locations = self.location_counts.len(),
            "replay wrapped"
        );
        self.cursor = 0;
        self.cycle += 1;
        self.cause_counts.clear();
        self.location_counts.clear();
        self.latest = None;
    }
}

/// Feeds records into an [`Aggregator`] on a fixed interval.
pub struct ReplayDriver<'a> {
    records: &'a [OutageRecord],
    engine: &'a Engine,
    aggregator: Aggregator,
    interval: Duration,
}

impl<'a> ReplayDriver<'a> {
    pub fn new(records: &'a [OutageRecord], engine: &'a Engine, interval: Duration) -> Self {
        Self {
            records,
            engine,
            aggregator: Aggregator::new(),
            interval,
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// One tick followed by a fresh snapshot.
    pub fn step(&mut self) -> Snapshot {
        self.aggregator.tick(self.records, self.engine);
        snapshot::build(&self.aggregator)
    }

    /// Tick until `max_ticks` is reached, or forever when it is `None`.
    /// `on_tick` receives every snapshot; the interval is slept between ticks.
    pub fn run<F>(&mut self, max_ticks: Option<usize>, mut on_tick: F)
    where
        F: FnMut(&Snapshot),
    {
        info!(
            records = self.records.len(),
            interval_ms = self.interval.as_millis() as u64,
            "starting replay"
        );
        let mut ticks = 0usize;
        while max_ticks.map_or(true, |max| ticks < max) {
            if ticks > 0 && !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
            let snap = self.step();
            on_tick(&snap);
            ticks += 1;
        }
        info!(ticks, cycles = self.aggregator.cycle(), "replay stopped");
    }
}
