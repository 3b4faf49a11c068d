// CSV/JSON export and markdown previews.
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::debug;

use crate::error::Result;
use crate::types::CauseMatrix;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "csv written");
    Ok(())
}

/// The matrix has one column per category present, so the header is built
/// at runtime instead of coming from a row struct.
pub fn write_matrix_csv(path: &Path, matrix: &CauseMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(matrix.header())?;
    for rec in matrix.records() {
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = matrix.rows.len(), "matrix csv written");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table<T>(report_no: usize, title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\nReport {}: {}", report_no, title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn render_matrix(matrix: &CauseMatrix, max_rows: usize) -> Option<String> {
    if matrix.rows.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    builder.push_record(matrix.header());
    for rec in matrix.records().into_iter().take(max_rows) {
        builder.push_record(rec);
    }
    Some(builder.build().with(Style::markdown()).to_string())
}

pub fn preview_matrix(report_no: usize, title: &str, matrix: &CauseMatrix, max_rows: usize) {
    println!("\nReport {}: {}", report_no, title);
    println!();
    match render_matrix(matrix, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CauseCategory, CauseMatrixRow, LocationCountRow};
    use tempfile::TempDir;

    fn matrix() -> CauseMatrix {
        CauseMatrix {
            categories: vec![CauseCategory::Maintenance, CauseCategory::Renovation],
            rows: vec![
                CauseMatrixRow {
                    location: "Varkaus".into(),
                    counts: vec![1, 2],
                    total: 3,
                },
                CauseMatrixRow {
                    location: "Kuopio".into(),
                    counts: vec![1, 0],
                    total: 1,
                },
            ],
        }
    }

    #[test]
    fn test_write_csv_uses_renamed_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("location_outage_summary.csv");
        let rows = vec![LocationCountRow {
            location: "Kuopio".into(),
            count: 4,
        }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Location,Outage Count\nKuopio,4\n");
    }

    #[test]
    fn test_write_matrix_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cause_by_location_matrix.csv");
        write_matrix_csv(&path, &matrix()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "location,Maintenance,Renovation,Total Outages\nVarkaus,1,2,3\nKuopio,1,0,1\n"
        );
    }

    #[test]
    fn test_render_matrix_limits_rows() {
        let table = render_matrix(&matrix(), 1).unwrap();
        assert!(table.contains("Varkaus"));
        assert!(!table.contains("Kuopio"));
        assert!(render_matrix(&CauseMatrix::default(), 5).is_none());
    }

    #[test]
    fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &serde_json::json!({"total_records": 3})).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back["total_records"], 3);
    }
}
