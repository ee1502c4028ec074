//! CSV export of a user's history.
//!
//! Columns follow the record fields: `user_id,timestamp,weight_kg,height_m,bmi,category`.
//! The header is always written, so an empty history still yields a valid file.

use crate::{BmiRecord, Error, RecordStore, Result};
use chrono::SecondsFormat;
use std::fs::File;
use std::path::Path;

const HEADER: [&str; 6] = ["user_id", "timestamp", "weight_kg", "height_m", "bmi", "category"];

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    user_id: &'a str,
    timestamp: String,
    weight_kg: f64,
    height_m: f64,
    bmi: f64,
    category: &'static str,
}

impl<'a> From<&'a BmiRecord> for CsvRow<'a> {
    fn from(record: &'a BmiRecord) -> Self {
        CsvRow {
            user_id: &record.user_id,
            timestamp: record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            weight_kg: record.weight_kg,
            height_m: record.height_m,
            bmi: record.bmi,
            category: record.category.as_str(),
        }
    }
}

/// Write all records for `user_id` to `destination`, oldest first
///
/// Returns the number of data rows written. The file is created or
/// truncated and synced to disk before returning.
pub fn export_csv<S: RecordStore + ?Sized>(
    store: &S,
    user_id: &str,
    destination: &Path,
) -> Result<usize> {
    let records = store.list_records(user_id)?;
    write_records(&records, destination)?;

    tracing::info!(
        "Exported {} records for '{}' to {:?}",
        records.len(),
        user_id.trim(),
        destination
    );
    Ok(records.len())
}

/// Write an already loaded record list as CSV
pub fn write_records(records: &[BmiRecord], destination: &Path) -> Result<()> {
    let file = File::create(destination)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(HEADER).map_err(write_error)?;
    for record in records {
        writer.serialize(CsvRow::from(record)).map_err(write_error)?;
    }

    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    Ok(())
}

/// Failures writing to the destination surface as `Io` regardless of
/// whether the csv buffer or the final flush hit them
fn write_error(e: csv::Error) -> Error {
    if !e.is_io_error() {
        return Error::Csv(e);
    }
    match e.into_kind() {
        csv::ErrorKind::Io(err) => Error::Io(err),
        other => Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{:?}", other),
        )),
    }
}

/// Default export file name for a user, e.g. `alice_bmi_history.csv`
pub fn default_export_file_name(user_id: &str) -> String {
    let safe: String = user_id
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}_bmi_history.csv", safe)
}
