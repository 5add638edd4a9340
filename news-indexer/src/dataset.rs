//! JSON Lines dataset reader.
//!
//! Each non-blank line is one JSON object describing a news article. Calendar
//! columns missing from a row are derived from `published_at_ts`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::IndexingError;
use news_indexer_shared::{CellValue, PublishedDate, SourceRecord};

const PUBLISHED_AT_COLUMN: &str = "published_at_ts";

/// Read every record of a JSON Lines file.
#[instrument]
pub fn read_dataset(path: &Path) -> Result<Vec<SourceRecord>, IndexingError> {
    let file = File::open(path).map_err(|e| {
        IndexingError::dataset(format!("Cannot open {}: {}", path.display(), e))
    })?;

    let records = parse_records(BufReader::new(file))?;
    info!(records = records.len(), path = %path.display(), "Dataset loaded");
    Ok(records)
}

/// Parse JSON Lines from `reader`.
///
/// Records are numbered in order of appearance, skipping blank lines, so the
/// position is stable for a given file.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<SourceRecord>, IndexingError> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
            IndexingError::dataset(format!("Line {}: invalid JSON: {}", index + 1, e))
        })?;

        let mut record = SourceRecord::from_json(records.len(), &value)
            .map_err(|e| IndexingError::dataset(format!("Line {}: {}", index + 1, e)))?;
        derive_calendar_columns(&mut record);
        records.push(record);
    }

    Ok(records)
}

/// Fill `published_year`, `published_month` and `published_week` from the
/// publication timestamp when the row does not carry them.
pub fn derive_calendar_columns(record: &mut SourceRecord) {
    let timestamp = match record.present(PUBLISHED_AT_COLUMN) {
        Some(CellValue::Int(ts)) => *ts,
        Some(CellValue::Float(ts)) if ts.is_finite() => ts.trunc() as i64,
        _ => return,
    };

    let Some(date) = PublishedDate::from_timestamp(timestamp) else {
        return;
    };

    for (column, value) in [
        ("published_year", date.year),
        ("published_month", date.month),
        ("published_week", date.week),
    ] {
        if record.present(column).is_none() {
            record.insert(column, i64::from(value));
        }
    }
    debug!(position = record.position, week = date.week, "Derived calendar columns");
}
