//! Mean/min/max over a user's BMI history.
//!
//! Always recomputed from the full record list; nothing is cached.

use crate::{BmiRecord, BmiSummary, Error, RecordStore, Result};

/// Summarize all stored BMI values for a user
///
/// Fails with [`Error::NoData`] when the user has no records.
pub fn summarize<S: RecordStore + ?Sized>(store: &S, user_id: &str) -> Result<BmiSummary> {
    let records = store.list_records(user_id)?;
    summarize_records(&records).ok_or_else(|| Error::NoData(user_id.trim().to_string()))
}

/// Summarize an already loaded record list; `None` when it is empty
pub fn summarize_records(records: &[BmiRecord]) -> Option<BmiSummary> {
    if records.is_empty() {
        return None;
    }

    let (sum, min, max) = records.iter().fold(
        (0.0_f64, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), r| (sum + r.bmi, min.min(r.bmi), max.max(r.bmi)),
    );

    Some(BmiSummary {
        count: records.len(),
        mean: sum / records.len() as f64,
        min,
        max,
    })
}
