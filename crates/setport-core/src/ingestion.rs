use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::offset::LocalResult;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::types::{SetRecord, SourceExport};

pub const SOURCE_DELIMITER: u8 = b';';

const DATE_FORMAT: &str = "%d.%m.%Y";
// The export writes minute precision on older app versions.
static TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Positions of the source columns we consume, resolved from the header row.
#[derive(Debug, Clone)]
struct ColumnIndex {
    date: usize,
    time: usize,
    routine: usize,
    exercise: usize,
    set_order: usize,
    weight: Option<usize>,
    reps: Option<usize>,
    duration: Option<usize>,
    distance: Option<usize>,
    note: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|field| field.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &'static str| {
            find(name).ok_or(ConvertError::MissingColumn { column: name })
        };

        Ok(Self {
            date: required("Date")?,
            time: required("Time")?,
            routine: required("Routine")?,
            exercise: required("Exercise")?,
            set_order: required("Set")?,
            weight: find("Weight"),
            reps: find("Reps"),
            duration: find("Duration"),
            distance: find("Distance"),
            note: find("Note"),
        })
    }
}

/// Parses the source export from `path` and normalizes every row timestamp
/// from `timezone`-local wall time to UTC.
pub fn read_source(path: &Path, timezone: Tz) -> Result<SourceExport> {
    let file = File::open(path)?;
    read_source_from_reader(file, timezone)
}

/// Reader-based variant of [`read_source`]. Row order is preserved; it is the
/// authoritative tie-break for first-appearance ordering downstream. Any
/// malformed required field aborts the whole run.
pub fn read_source_from_reader<R: Read>(reader: R, timezone: Tz) -> Result<SourceExport> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(SOURCE_DELIMITER)
        .flexible(true)
        .from_reader(reader);

    let header = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_header(&header)?;

    let mut raw_rows = Vec::new();
    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        // Header is line 1, first data row line 2.
        let line = index + 2;
        records.push(parse_record(&row, &columns, timezone, line)?);
        raw_rows.push(row);
    }

    debug!(rows = records.len(), %timezone, "parsed source export");

    Ok(SourceExport {
        header,
        raw_rows,
        records,
    })
}

fn parse_record(
    row: &StringRecord,
    columns: &ColumnIndex,
    timezone: Tz,
    line: usize,
) -> Result<SetRecord> {
    let date = parse_date(required_field(row, columns.date, "Date", line)?, line)?;
    let time = parse_time(required_field(row, columns.time, "Time", line)?, line)?;
    let routine = required_field(row, columns.routine, "Routine", line)?.to_string();
    let exercise = required_field(row, columns.exercise, "Exercise", line)?.to_string();
    let set_order = parse_required_u32(
        required_field(row, columns.set_order, "Set", line)?,
        "Set",
        line,
    )?;

    let timestamp_utc = localize(date.and_time(time), timezone, line)?;

    Ok(SetRecord {
        date,
        timestamp_utc,
        routine,
        exercise,
        set_order,
        weight_kg: parse_optional_f64(optional_field(row, columns.weight), "Weight", line)?,
        reps: parse_optional_u32(optional_field(row, columns.reps), "Reps", line)?,
        duration_min: parse_optional_f64(optional_field(row, columns.duration), "Duration", line)?,
        distance_km: parse_optional_f64(optional_field(row, columns.distance), "Distance", line)?,
        note: optional_field(row, columns.note)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    })
}

fn required_field<'a>(
    row: &'a StringRecord,
    index: usize,
    column: &'static str,
    line: usize,
) -> Result<&'a str> {
    row.get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConvertError::MissingField { line, column })
}

fn optional_field<'a>(row: &'a StringRecord, index: Option<usize>) -> Option<&'a str> {
    index.and_then(|i| row.get(i))
}

fn parse_date(value: &str, line: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| ConvertError::InvalidField {
        line,
        column: "Date",
        message: format!("invalid date '{value}': {err}"),
    })
}

fn parse_time(value: &str, line: usize) -> Result<NaiveTime> {
    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(value, fmt) {
            return Ok(time);
        }
    }
    Err(ConvertError::InvalidField {
        line,
        column: "Time",
        message: format!("invalid time '{value}'"),
    })
}

/// Resolves a local wall time to a UTC instant in `timezone`.
///
/// Ambiguous times at a fall-back transition take the later (post-transition)
/// offset. Times inside a spring-forward gap never occurred on a wall clock,
/// so they are treated as corrupt input rather than adjusted.
fn localize(
    local: NaiveDateTime,
    timezone: Tz,
    line: usize,
) -> Result<chrono::DateTime<Utc>> {
    let resolved = match timezone.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(dt1, dt2) => {
            debug!(%local, %timezone, "ambiguous local time, taking later offset");
            if dt1.naive_utc() > dt2.naive_utc() {
                dt1
            } else {
                dt2
            }
        }
        LocalResult::None => {
            return Err(ConvertError::NonexistentLocalTime {
                line,
                local,
                timezone,
            })
        }
    };
    Ok(resolved.with_timezone(&Utc))
}

fn parse_required_u32(value: &str, column: &'static str, line: usize) -> Result<u32> {
    value.parse::<u32>().map_err(|err| ConvertError::InvalidField {
        line,
        column,
        message: format!("failed to parse '{value}' as integer: {err}"),
    })
}

fn parse_optional_u32(
    value: Option<&str>,
    column: &'static str,
    line: usize,
) -> Result<Option<u32>> {
    match clean_optional(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|err| ConvertError::InvalidField {
                line,
                column,
                message: format!("failed to parse '{v}' as integer: {err}"),
            }),
    }
}

fn parse_optional_f64(
    value: Option<&str>,
    column: &'static str,
    line: usize,
) -> Result<Option<f64>> {
    match clean_optional(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .map(Some)
            .map_err(|err| ConvertError::InvalidField {
                line,
                column,
                message: format!("failed to parse '{v}' as float: {err}"),
            }),
    }
}

/// Blank or whitespace-only fields mean "not recorded", which is distinct
/// from an explicit zero.
fn clean_optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::Europe::Oslo;

    const HEADER: &str = "Date;Time;Routine;Exercise;Set;Weight;Reps;Duration;Distance;Note";

    fn ingest(rows: &str) -> Result<SourceExport> {
        let data = format!("{HEADER}\n{rows}");
        read_source_from_reader(data.as_bytes(), Oslo)
    }

    #[test]
    fn parses_a_strength_row() {
        let export = ingest("01.01.2024;10:00:00;Push Day;Bench Press;1;60;8;;;felt strong")
            .expect("ingest");
        assert_eq!(export.records.len(), 1);

        let record = &export.records[0];
        assert_eq!(record.routine, "Push Day");
        assert_eq!(record.exercise, "Bench Press");
        assert_eq!(record.set_order, 1);
        assert_eq!(record.weight_kg, Some(60.0));
        assert_eq!(record.reps, Some(8));
        assert_eq!(record.duration_min, None);
        assert_eq!(record.distance_km, None);
        assert_eq!(record.note.as_deref(), Some("felt strong"));
        // Oslo is UTC+1 in January.
        assert_eq!(record.timestamp_utc.hour(), 9);
    }

    #[test]
    fn blank_optionals_stay_absent_not_zero() {
        let export = ingest("01.01.2024;10:00:00;Cardio;Treadmill;1;;;5.0;2.5;").expect("ingest");
        let record = &export.records[0];
        assert_eq!(record.weight_kg, None);
        assert_eq!(record.reps, None);
        assert_eq!(record.duration_min, Some(5.0));
        assert_eq!(record.distance_km, Some(2.5));
        assert_eq!(record.note, None);
    }

    #[test]
    fn accepts_minute_precision_times() {
        let export = ingest("01.01.2024;10:05;Push Day;Bench Press;1;60;8;;;").expect("ingest");
        assert_eq!(export.records[0].timestamp_utc.minute(), 5);
    }

    #[test]
    fn summer_dates_use_the_dst_offset() {
        let export = ingest("01.07.2024;10:00:00;Push Day;Bench Press;1;60;8;;;").expect("ingest");
        // Oslo is UTC+2 in July.
        assert_eq!(export.records[0].timestamp_utc.hour(), 8);
    }

    #[test]
    fn fall_back_ambiguity_resolves_to_the_later_instant() {
        // 2024-10-27 02:30 happens twice in Oslo; the later instant is UTC+1.
        let export = ingest("27.10.2024;02:30:00;Push Day;Bench Press;1;60;8;;;").expect("ingest");
        assert_eq!(export.records[0].timestamp_utc.hour(), 1);
    }

    #[test]
    fn spring_forward_gap_is_fatal() {
        // 2024-03-31 02:30 never existed in Oslo.
        let err = ingest("31.03.2024;02:30:00;Push Day;Bench Press;1;60;8;;;").unwrap_err();
        assert!(matches!(err, ConvertError::NonexistentLocalTime { line: 2, .. }));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let data = "Date;Time;Exercise;Set\n01.01.2024;10:00:00;Bench Press;1";
        let err = read_source_from_reader(data.as_bytes(), Oslo).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingColumn { column: "Routine" }
        ));
    }

    #[test]
    fn malformed_required_field_aborts_the_run() {
        let err = ingest("not-a-date;10:00:00;Push Day;Bench Press;1;60;8;;;").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidField {
                line: 2,
                column: "Date",
                ..
            }
        ));
    }

    #[test]
    fn blank_required_field_aborts_the_run() {
        let err = ingest("01.01.2024;10:00:00;Push Day;;1;60;8;;;").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingField {
                line: 2,
                column: "Exercise"
            }
        ));
    }
}
