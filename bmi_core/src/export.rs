//! Export of a person's measurements to CSV and JSON.

use crate::types::format_timestamp;
use crate::{Measurement, Result, SeriesPoint};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: i64,
    person_name: &'a str,
    weight_kg: f64,
    height_m: f64,
    bmi: f64,
    recorded_at: String,
}

impl<'a> From<&'a Measurement> for CsvRow<'a> {
    fn from(m: &'a Measurement) -> Self {
        CsvRow {
            id: m.id,
            person_name: &m.person_name,
            weight_kg: m.weight_kg,
            height_m: m.height_m,
            bmi: m.bmi,
            recorded_at: format_timestamp(&m.recorded_at),
        }
    }
}

/// Write records to a new CSV file at `path`, replacing any existing file.
///
/// The header row is always written, even for an empty slice. Returns the
/// number of records written.
pub fn write_records_csv(path: &Path, records: &[Measurement]) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(["id", "person_name", "weight_kg", "height_m", "bmi", "recorded_at"])?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} measurements to {:?}", records.len(), path);
    Ok(records.len())
}

/// Serialize a series as pretty JSON
pub fn series_to_json(series: &[SeriesPoint]) -> Result<String> {
    Ok(serde_json::to_string_pretty(series)?)
}
