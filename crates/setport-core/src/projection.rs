use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{ConvertError, Result};
use crate::ingestion::SOURCE_DELIMITER;
use crate::mappings::ExerciseMappings;
use crate::types::{SetRecord, WorkoutSession};

/// Destination timestamp encoding, applied after UTC normalization.
const DEST_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A typed destination cell. The writer quotes text and leaves numbers bare,
/// so every column must carry a value of the correct type even when the
/// source has no concept for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{v}"),
            // Keep a trailing ".0" on whole floats so float columns stay
            // visibly float-typed in the output.
            Field::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            Field::Float(v) => write!(f, "{v}"),
            Field::Text(v) => f.write_str(v),
        }
    }
}

/// Reads the destination column list from the sample file's header row. The
/// sample, not this crate, owns the output schema; column names and order are
/// taken verbatim.
pub fn read_destination_header(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    read_destination_header_from_reader(file)
}

pub fn read_destination_header_from_reader<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(SOURCE_DELIMITER)
        .from_reader(reader);
    let header: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if header.is_empty() || header.iter().all(|name| name.is_empty()) {
        return Err(ConvertError::EmptyDestinationHeader);
    }
    Ok(header)
}

/// Projects one annotated set record onto the destination columns, in header
/// order. Every column resolves to a typed value: mapped source fields,
/// session-derived fields, or the column's typed default when the source has
/// no counterpart. Never fails and never drops a row.
pub fn project_row(
    record: &SetRecord,
    session: &WorkoutSession,
    mappings: &ExerciseMappings,
    header: &[String],
) -> Vec<Field> {
    header
        .iter()
        .map(|column| project_field(record, session, mappings, column))
        .collect()
}

fn project_field(
    record: &SetRecord,
    session: &WorkoutSession,
    mappings: &ExerciseMappings,
    column: &str,
) -> Field {
    match column {
        "Date" => Field::Text(
            session
                .start_utc
                .format(DEST_DATETIME_FORMAT)
                .to_string(),
        ),
        "Workout Name" => Field::Text(record.routine.clone()),
        "Duration (sec)" => Field::Int(session.duration().num_seconds()),
        "Workout #" => Field::Int(i64::from(session.number)),
        "Exercise Name" => Field::Text(mappings.resolve(&record.exercise).to_string()),
        "Set Order" => Field::Int(i64::from(record.set_order)),
        "Weight (kg)" => Field::Float(record.weight_kg.unwrap_or(0.0)),
        "Reps" => Field::Int(record.reps.map(i64::from).unwrap_or(0)),
        // Source duration is minutes; the destination wants whole seconds.
        "Seconds" => Field::Int(
            record
                .duration_min
                .map(|minutes| (minutes * 60.0).round() as i64)
                .unwrap_or(0),
        ),
        // Source distance is kilometers; the destination wants meters.
        "Distance (meters)" => Field::Float(
            record
                .distance_km
                .map(|km| km * 1000.0)
                .unwrap_or(0.0),
        ),
        "Notes" => Field::Text(record.note.clone().unwrap_or_default()),
        // Destination-only columns (RPE, Workout Notes, anything the target
        // app adds later) have no source concept and stay blank.
        _ => Field::Text(String::new()),
    }
}
