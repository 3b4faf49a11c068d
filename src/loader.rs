// Dataset loading and field cleanup.
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{OutageError, Result};
use crate::interval::UNKNOWN_MARKER;
use crate::types::{OutageRecord, RawRow};
use crate::util::{value_to_i32, value_to_string};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Entries that were not JSON objects.
    pub skipped_rows: usize,
    /// Loaded records where at least one field fell back to a default.
    pub defaulted_rows: usize,
}

/// Load the processed outage dataset: a JSON array of objects.
///
/// A missing file is fatal. Individual entries are never rejected for bad
/// field values; they are kept with placeholder values and left for each
/// report to filter on its own terms.
pub fn load_records(path: &Path) -> Result<(Vec<OutageRecord>, LoadReport)> {
    if !path.exists() {
        return Err(OutageError::DatasetMissing(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| OutageError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let (records, report) = parse_records(&text)?;
    info!(
        path = %path.display(),
        loaded = report.loaded_rows,
        skipped = report.skipped_rows,
        "dataset loaded"
    );
    Ok((records, report))
}

pub fn parse_records(text: &str) -> Result<(Vec<OutageRecord>, LoadReport)> {
    let entries: Vec<Value> = serde_json::from_str(text)?;
    let total_rows = entries.len();
    let mut skipped_rows = 0usize;
    let mut defaulted_rows = 0usize;
    let mut records = Vec::with_capacity(total_rows);

    for (idx, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            warn!(index = idx, "skipping non-object dataset entry");
            skipped_rows += 1;
            continue;
        }
        let row: RawRow = serde_json::from_value(entry)?;
        let (record, defaulted) = clean_row(row);
        if defaulted {
            debug!(index = idx, location = %record.location_raw, "entry has missing fields");
            defaulted_rows += 1;
        }
        records.push(record);
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        skipped_rows,
        defaulted_rows,
    };
    Ok((records, report))
}

fn clean_row(row: RawRow) -> (OutageRecord, bool) {
    let mut defaulted = false;
    let mut text = |v: Option<&Value>, fallback: &str| {
        value_to_string(v).unwrap_or_else(|| {
            defaulted = true;
            fallback.to_string()
        })
    };
    let location_raw = text(row.location.as_ref(), "Unknown");
    let time_start_raw = text(row.time_start.as_ref(), UNKNOWN_MARKER);
    let time_end_raw = text(row.time_end.as_ref(), UNKNOWN_MARKER);

    // Missing calendar fields become 0; `interval` rejects a 0 year, month or
    // day, so such records drop out of duration reports only.
    let mut number = |v: Option<&Value>| {
        value_to_i32(v).unwrap_or_else(|| {
            defaulted = true;
            0
        })
    };
    let year = number(row.year.as_ref());
    let month = number(row.month.as_ref());
    let day = number(row.day.as_ref());

    let tags_raw = match row.tags {
        Some(Value::Array(tags)) => tags,
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    };

    let record = OutageRecord {
        location_raw,
        year,
        month,
        day,
        time_start_raw,
        time_end_raw,
        tags_raw,
    };
    (record, defaulted)
}
