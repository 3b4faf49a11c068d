// Read-only projections of replay state for whatever draws the dashboard.
use crate::replay::{Aggregator, ProcessedEvent};
use crate::tally::Tally;
use crate::types::{CauseCategory, CauseShareRow, LocationCountRow};

pub const TOP_LOCATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Events processed in the current cycle.
    pub events_in_cycle: usize,
    pub cause_shares: Vec<CauseShareRow>,
    pub top_locations: Vec<LocationCountRow>,
    pub latest_event: Option<String>,
    /// `(step, step)` for every step of the current cycle so far.
    pub cumulative: Vec<(usize, usize)>,
}

pub fn build(agg: &Aggregator) -> Snapshot {
    Snapshot {
        events_in_cycle: agg.cursor(),
        cause_shares: cause_shares(agg.cause_counts()),
        top_locations: top_locations(agg.location_counts(), TOP_LOCATIONS),
        latest_event: agg.latest().map(describe_event),
        cumulative: cumulative_series(agg.latest()),
    }
}

/// Part-to-whole view of the cause tally in first-seen order. An empty
/// tally yields no rows.
pub fn cause_shares(counts: &Tally<CauseCategory>) -> Vec<CauseShareRow> {
    if counts.is_empty() {
        return Vec::new();
    }
    let total = counts.total();
    counts
        .iter()
        .map(|(cause, count)| CauseShareRow {
            cause: *cause,
            count,
            share: count as f64 / total as f64,
        })
        .collect()
}

pub fn top_locations(counts: &Tally<String>, n: usize) -> Vec<LocationCountRow> {
    counts
        .ranked()
        .into_iter()
        .take(n)
        .map(|(location, count)| LocationCountRow { location, count })
        .collect()
}

pub fn describe_event(event: &ProcessedEvent) -> String {
    let location = if event.location_canonical == event.location_raw {
        event.location_canonical.clone()
    } else {
        format!("{} ({})", event.location_canonical, event.location_raw)
    };
    let duration = match event.duration_hours {
        Some(h) => format!("{:.2} h", h),
        None => "unparsable".to_string(),
    };
    let causes = if event.causes.is_empty() {
        "no recognized cause".to_string()
    } else {
        event
            .causes
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "#{} | Location: {} | Time: {} - {} ({}) | Cause: {}",
        event.step + 1,
        location,
        event.time_start_raw,
        event.time_end_raw,
        duration,
        causes
    )
}

pub fn cumulative_series(latest: Option<&ProcessedEvent>) -> Vec<(usize, usize)> {
    match latest {
        Some(event) => (0..=event.step).map(|i| (i, i)).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::types::fixtures::record;
    use crate::types::OutageRecord;

    fn engine() -> Engine {
        Engine::new(&EngineConfig::default()).unwrap()
    }

    fn data() -> Vec<OutageRecord> {
        vec![
            record("Nilsiä", (2024, 5, 2), "08:00", "10:30", &["Kaivuutyöt"]),
            record("Kuopio", (2024, 5, 9), "22:00", "02:00", &["Huoltotyöt", "xyz"]),
            record("Varkaus", (2024, 5, 20), "Unknown", "Unknown", &["Saneeraus"]),
            record("Iisalmi", (2024, 6, 1), "9", "10", &["xyz"]),
            record("Tervo", (2024, 6, 2), "9", "10", &[]),
            record("Keitele", (2024, 6, 3), "9", "10", &[]),
            record("Vesanto", (2024, 6, 4), "9", "10", &[]),
        ]
    }

    #[test]
    fn test_empty_state_snapshot() {
        let snap = build(&Aggregator::new());
        assert_eq!(snap.events_in_cycle, 0);
        assert!(snap.cause_shares.is_empty());
        assert!(snap.top_locations.is_empty());
        assert!(snap.latest_event.is_none());
        assert!(snap.cumulative.is_empty());
    }

    #[test]
    fn test_cause_shares_sum_to_one() {
        let e = engine();
        let d = data();
        let mut agg = Aggregator::new();
        for _ in 0..3 {
            agg.tick(&d, &e);
        }
        let shares = cause_shares(agg.cause_counts());
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[0].cause, CauseCategory::Digging);
        let sum: f64 = shares.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_five_locations() {
        let e = engine();
        let d = data();
        let mut agg = Aggregator::new();
        for _ in 0..d.len() {
            agg.tick(&d, &e);
        }
        let snap = build(&agg);
        let names: Vec<&str> = snap.top_locations.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(names, vec!["Kuopio", "Varkaus", "Iisalmi", "Tervo", "Keitele"]);
        assert_eq!(snap.top_locations[0].count, 2);
    }

    #[test]
    fn test_latest_event_description() {
        let e = engine();
        let d = data();
        let mut agg = Aggregator::new();

        agg.tick(&d, &e);
        assert_eq!(
            build(&agg).latest_event.unwrap(),
            "#1 | Location: Kuopio (Nilsiä) | Time: 08:00 - 10:30 (2.50 h) | Cause: Digging"
        );

        agg.tick(&d, &e);
        agg.tick(&d, &e);
        assert_eq!(
            build(&agg).latest_event.unwrap(),
            "#3 | Location: Varkaus | Time: Unknown - Unknown (unparsable) | Cause: Renovation"
        );

        agg.tick(&d, &e);
        assert!(build(&agg)
            .latest_event
            .unwrap()
            .ends_with("Cause: no recognized cause"));
    }

    #[test]
    fn test_cumulative_series_resets_on_wrap() {
        let e = engine();
        let d = data();
        let mut agg = Aggregator::new();

        agg.tick(&d, &e);
        assert_eq!(build(&agg).cumulative, vec![(0, 0)]);
        agg.tick(&d, &e);
        agg.tick(&d, &e);
        assert_eq!(build(&agg).cumulative, vec![(0, 0), (1, 1), (2, 2)]);

        for _ in 3..d.len() {
            agg.tick(&d, &e);
        }
        assert_eq!(build(&agg).cumulative.len(), d.len());

        agg.tick(&d, &e);
        let snap = build(&agg);
        assert_eq!(snap.cumulative, vec![(0, 0)]);
        assert_eq!(snap.events_in_cycle, 1);
    }
}
