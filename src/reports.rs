// Batch reports over the whole dataset.
//
// Each report is a pure function of the records; location counts come in a
// raw flavour (names as written) and a canonical one (aliases resolved).
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::panic;
use std::thread;
use tracing::debug;

use crate::engine::Engine;
use crate::interval;
use crate::tally::Tally;
use crate::types::{
    CauseCategory, CauseCountRow, CauseMatrix, CauseMatrixRow, LocationCountRow,
    MonthlyDurationRow, OutageRecord, SummaryStats,
};

fn location_rows(tally: Tally<String>) -> Vec<LocationCountRow> {
    tally
        .ranked()
        .into_iter()
        .map(|(location, count)| LocationCountRow { location, count })
        .collect()
}

/// Outages per location exactly as written in the dataset. Aliases are not
/// resolved here, so a defunct town keeps its own row.
pub fn raw_location_frequency(data: &[OutageRecord]) -> Vec<LocationCountRow> {
    location_rows(data.iter().map(|r| r.location_raw.clone()).collect())
}

/// Outages per current municipality, the way the live replay counts them.
pub fn canonical_location_frequency(data: &[OutageRecord], engine: &Engine) -> Vec<LocationCountRow> {
    location_rows(
        data.iter()
            .map(|r| engine.locations.resolve(&r.location_raw).to_string())
            .collect(),
    )
}

/// Accepted tags per category over the whole dataset.
pub fn cause_frequency(data: &[OutageRecord], engine: &Engine) -> Vec<CauseCountRow> {
    let tally: Tally<CauseCategory> = data
        .iter()
        .flat_map(|r| engine.causes.classify_all(&r.tags_raw))
        .collect();
    tally
        .ranked()
        .into_iter()
        .map(|(cause, count)| CauseCountRow { cause, count })
        .collect()
}

/// Total outage hours per calendar month, oldest first. Records without a
/// valid duration are left out of the sums.
pub fn monthly_duration(data: &[OutageRecord]) -> Vec<MonthlyDurationRow> {
    let mut map: BTreeMap<(i32, i32), f64> = BTreeMap::new();
    let mut skipped = 0usize;
    for r in data {
        match interval::duration_hours(r) {
            Ok(hours) => *map.entry((r.year, r.month)).or_insert(0.0) += hours,
            Err(_) => skipped += 1,
        }
    }
    debug!(months = map.len(), skipped, "monthly duration computed");

    map.into_iter()
        .map(|((year, month), total_hours)| MonthlyDurationRow {
            year,
            month,
            total_hours,
            sortable_date: format!("{}-{:02}", year, month),
        })
        .collect()
}

/// Accepted causes per raw location, one column per category seen, plus the
/// row total. Rows are sorted by total descending.
pub fn cause_by_location(data: &[OutageRecord], engine: &Engine) -> CauseMatrix {
    struct Acc {
        first_seen: usize,
        counts: HashMap<CauseCategory, usize>,
    }

    let mut map: HashMap<&str, Acc> = HashMap::new();
    let mut seen: BTreeSet<CauseCategory> = BTreeSet::new();
    for r in data {
        for cause in engine.causes.classify_all(&r.tags_raw) {
            let next = map.len();
            let e = map.entry(r.location_raw.as_str()).or_insert_with(|| Acc {
                first_seen: next,
                counts: HashMap::new(),
            });
            *e.counts.entry(cause).or_insert(0) += 1;
            seen.insert(cause);
        }
    }

    let categories: Vec<CauseCategory> = seen.into_iter().collect();
    let mut rows: Vec<(usize, CauseMatrixRow)> = map
        .into_iter()
        .map(|(location, acc)| {
            let counts: Vec<usize> = categories
                .iter()
                .map(|c| acc.counts.get(c).copied().unwrap_or(0))
                .collect();
            let total = counts.iter().sum();
            let row = CauseMatrixRow {
                location: location.to_string(),
                counts,
                total,
            };
            (acc.first_seen, row)
        })
        .collect();
    rows.sort_by(|a, b| b.1.total.cmp(&a.1.total).then(a.0.cmp(&b.0)));

    CauseMatrix {
        categories,
        rows: rows.into_iter().map(|(_, row)| row).collect(),
    }
}

pub fn generate_summary(data: &[OutageRecord], engine: &Engine) -> SummaryStats {
    let locations: HashSet<&str> = data.iter().map(|r| r.location_raw.as_str()).collect();
    let mut valid_durations = 0usize;
    let mut total_hours = 0.0;
    let mut classified_tags = 0usize;
    let mut total_tags = 0usize;
    for r in data {
        let n = engine.normalize(r);
        if let Some(h) = n.duration_hours {
            valid_durations += 1;
            total_hours += h;
        }
        classified_tags += n.causes.len();
        total_tags += r.tags_raw.len();
    }
    SummaryStats {
        total_records: data.len(),
        total_locations: locations.len(),
        valid_durations,
        invalid_durations: data.len() - valid_durations,
        total_hours,
        classified_tags,
        dropped_tags: total_tags - classified_tags,
    }
}

/// Every batch report over one dataset.
#[derive(Debug)]
pub struct BatchReports {
    pub locations: Vec<LocationCountRow>,
    pub canonical_locations: Vec<LocationCountRow>,
    pub monthly: Vec<MonthlyDurationRow>,
    pub matrix: CauseMatrix,
    pub causes: Vec<CauseCountRow>,
    pub summary: SummaryStats,
}

/// Compute the independent reports concurrently. They only read `data` and
/// `engine`, so no synchronization is needed.
pub fn generate_all(data: &[OutageRecord], engine: &Engine) -> BatchReports {
    thread::scope(|s| {
        let locations = s.spawn(|| raw_location_frequency(data));
        let monthly = s.spawn(|| monthly_duration(data));
        let matrix = s.spawn(|| cause_by_location(data, engine));
        let canonical_locations = canonical_location_frequency(data, engine);
        let causes = cause_frequency(data, engine);
        let summary = generate_summary(data, engine);
        BatchReports {
            locations: locations.join().unwrap_or_else(|e| panic::resume_unwind(e)),
            monthly: monthly.join().unwrap_or_else(|e| panic::resume_unwind(e)),
            matrix: matrix.join().unwrap_or_else(|e| panic::resume_unwind(e)),
            canonical_locations,
            causes,
            summary,
        }
    })
}
