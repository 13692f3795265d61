use std::ops::Range;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use csv::StringRecord;
use serde::Serialize;

/// One exercise-set entry as recorded by the source app. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetRecord {
    /// Calendar date as written in the export, in the source-local timezone.
    pub date: NaiveDate,
    /// Start-of-exercise instant, normalized to UTC during ingestion.
    pub timestamp_utc: DateTime<Utc>,
    pub routine: String,
    pub exercise: String,
    pub set_order: u32,
    pub weight_kg: Option<f64>,
    pub reps: Option<u32>,
    /// Cardio/timed exercises only; minutes. Absent is not zero.
    pub duration_min: Option<f64>,
    /// Cardio only; kilometers. Absent is not zero.
    pub distance_km: Option<f64>,
    pub note: Option<String>,
}

/// The parsed source export: typed records plus the raw rows they came from.
///
/// Raw rows are kept in source shape (same header, same field order) so the
/// unmapped-name finder can re-emit them verbatim. `records[i]` was parsed
/// from `raw_rows[i]`; input order is preserved throughout.
#[derive(Debug, Clone)]
pub struct SourceExport {
    pub header: StringRecord,
    pub raw_rows: Vec<StringRecord>,
    pub records: Vec<SetRecord>,
}

/// A contiguous run of set records sharing workout identity, reconstructed
/// from the export's own row ordering. Exists only as a computed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSession {
    /// 1-based, assigned in first-appearance order.
    pub number: u32,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    /// Index range of the member records within the source export.
    pub rows: Range<usize>,
}

impl WorkoutSession {
    /// Non-negative by construction since both endpoints come from member
    /// timestamps. A single-record session has zero duration.
    pub fn duration(&self) -> Duration {
        self.end_utc - self.start_utc
    }
}
