// Records, taxonomy and report row types.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tabled::Tabled;

use crate::util::format_number;

/// One entry of the processed dataset, exactly as it appears on disk.
///
/// Every field is optional and loosely typed; `loader` turns it into an
/// [`OutageRecord`] without rejecting anything it can salvage.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub month: Option<Value>,
    #[serde(default)]
    pub day: Option<Value>,
    #[serde(default)]
    pub time_start: Option<Value>,
    #[serde(default)]
    pub time_end: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
}

/// A single outage as read from the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct OutageRecord {
    pub location_raw: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub time_start_raw: String,
    pub time_end_raw: String,
    /// Tags are kept as JSON values: they may be text, null or anything else.
    pub tags_raw: Vec<Value>,
}

/// Fixed cause taxonomy. Declaration order is the column order of the
/// cause matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CauseCategory {
    Maintenance,
    Digging,
    Renovation,
    Repair,
    DamageRepair,
}

impl CauseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CauseCategory::Maintenance => "Maintenance",
            CauseCategory::Digging => "Digging",
            CauseCategory::Renovation => "Renovation",
            CauseCategory::Repair => "Repair",
            CauseCategory::DamageRepair => "DamageRepair",
        }
    }
}

impl fmt::Display for CauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level view of a record after alias resolution, tag classification
/// and duration parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutage {
    pub location_canonical: String,
    /// One entry per accepted tag, duplicates included.
    pub causes: Vec<CauseCategory>,
    /// `None` when either time string could not be parsed.
    pub duration_hours: Option<f64>,
}

fn display_hours(hours: &f64) -> String {
    format_number(*hours, 2)
}

fn display_share(share: &f64) -> String {
    format!("{}%", format_number(share * 100.0, 1))
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct LocationCountRow {
    #[serde(rename = "Location")]
    #[tabled(rename = "Location")]
    pub location: String,
    #[serde(rename = "Outage Count")]
    #[tabled(rename = "Outage Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthlyDurationRow {
    #[serde(rename = "year")]
    #[tabled(rename = "year")]
    pub year: i32,
    #[serde(rename = "month")]
    #[tabled(rename = "month")]
    pub month: i32,
    #[serde(rename = "Total Duration (Hours)")]
    #[tabled(rename = "Total Duration (Hours)", display_with = "display_hours")]
    pub total_hours: f64,
    #[serde(rename = "SortableDate")]
    #[tabled(rename = "SortableDate")]
    pub sortable_date: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CauseCountRow {
    #[serde(rename = "Cause")]
    #[tabled(rename = "Cause")]
    pub cause: CauseCategory,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Part-to-whole entry of the live cause breakdown.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CauseShareRow {
    #[tabled(rename = "Cause")]
    pub cause: CauseCategory,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Share", display_with = "display_share")]
    pub share: f64,
}

/// One location row of the cause-by-location matrix. `counts` is aligned
/// with [`CauseMatrix::categories`].
#[derive(Debug, Clone, PartialEq)]
pub struct CauseMatrixRow {
    pub location: String,
    pub counts: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CauseMatrix {
    /// Categories that occur at least once, in taxonomy order.
    pub categories: Vec<CauseCategory>,
    /// Sorted by `total` descending.
    pub rows: Vec<CauseMatrixRow>,
}

impl CauseMatrix {
    #[cfg(test)]
    pub fn count(&self, location: &str, category: CauseCategory) -> usize {
        let Some(col) = self.categories.iter().position(|c| *c == category) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|r| r.location == location)
            .map(|r| r.counts[col])
            .unwrap_or(0)
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["location".to_string()];
        header.extend(self.categories.iter().map(|c| c.to_string()));
        header.push("Total Outages".to_string());
        header
    }

    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut rec = vec![row.location.clone()];
                rec.extend(row.counts.iter().map(|c| c.to_string()));
                rec.push(row.total.to_string());
                rec
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_locations: usize,
    pub valid_durations: usize,
    pub invalid_durations: usize,
    pub total_hours: f64,
    pub classified_tags: usize,
    pub dropped_tags: usize,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::OutageRecord;
    use serde_json::Value;

    pub fn record(location: &str, ymd: (i32, i32, i32), start: &str, end: &str, tags: &[&str]) -> OutageRecord {
        OutageRecord {
            location_raw: location.to_string(),
            year: ymd.0,
            month: ymd.1,
            day: ymd.2,
            time_start_raw: start.to_string(),
            time_end_raw: end.to_string(),
            tags_raw: tags.iter().map(|t| Value::String(t.to_string())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_category_display_matches_serde_name() {
        let json = serde_json::to_string(&CauseCategory::DamageRepair).unwrap();
        assert_eq!(json, "\"DamageRepair\"");
        assert_eq!(CauseCategory::DamageRepair.to_string(), "DamageRepair");
    }

    #[test]
    fn test_cause_matrix_count_lookup() {
        let matrix = CauseMatrix {
            categories: vec![CauseCategory::Maintenance, CauseCategory::Digging],
            rows: vec![CauseMatrixRow {
                location: "Kuopio".to_string(),
                counts: vec![2, 1],
                total: 3,
            }],
        };
        assert_eq!(matrix.count("Kuopio", CauseCategory::Digging), 1);
        assert_eq!(matrix.count("Kuopio", CauseCategory::Repair), 0);
        assert_eq!(matrix.count("Varkaus", CauseCategory::Maintenance), 0);
        assert_eq!(
            matrix.header(),
            vec!["location", "Maintenance", "Digging", "Total Outages"]
        );
        assert_eq!(matrix.records(), vec![vec!["Kuopio", "2", "1", "3"]]);
    }
}
