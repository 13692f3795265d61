use std::path::Path;

use chrono_tz::Tz;
use tracing::{info, warn};

use crate::error::Result;
use crate::grouping::group_sessions;
use crate::ingestion::read_source;
use crate::mappings::ExerciseMappings;
use crate::outputs::{write_destination_file, write_source_rows_file};
use crate::projection::{project_row, read_destination_header, Field};
use crate::types::SourceExport;
use crate::unmapped::find_unmapped;

/// The fully transformed export, ready to be written.
#[derive(Debug, Clone)]
pub struct ConvertedExport {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Field>>,
    pub session_count: usize,
    /// Distinct exercise names that passed through without a mapping entry,
    /// in first-appearance order. Non-fatal; the rows were still emitted.
    pub unmapped_names: Vec<String>,
}

/// Counts reported back to the caller after a completed conversion run.
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub rows_written: usize,
    pub session_count: usize,
    pub unmapped_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UnmappedSummary {
    pub rows_written: usize,
    pub unique_names: usize,
}

/// Runs grouping and projection over an ingested export. Pure with respect to
/// its inputs; identical inputs produce identical output rows.
pub fn convert_export(
    export: &SourceExport,
    header: &[String],
    mappings: &ExerciseMappings,
) -> ConvertedExport {
    let sessions = group_sessions(&export.records);

    let mut rows = Vec::with_capacity(export.records.len());
    let mut unmapped_names: Vec<String> = Vec::new();
    for session in &sessions {
        for record in &export.records[session.rows.clone()] {
            if !mappings.contains(&record.exercise)
                && !unmapped_names.iter().any(|name| name == &record.exercise)
            {
                warn!(exercise = %record.exercise, "no mapping entry, passing name through");
                unmapped_names.push(record.exercise.clone());
            }
            rows.push(project_row(record, session, mappings, header));
        }
    }

    ConvertedExport {
        header: header.to_vec(),
        rows,
        session_count: sessions.len(),
        unmapped_names,
    }
}

/// End-to-end conversion: read the source export, the destination sample
/// header, and the mapping table; transform; write the destination file.
///
/// Nothing is written until the whole transform has succeeded, so a parse
/// failure leaves no partial output behind. `mapping` is optional the way the
/// original workflow allowed running without a table: every name then passes
/// through unchanged.
pub fn run_convert(
    source: &Path,
    sample: &Path,
    mapping: Option<&Path>,
    timezone: Tz,
    output: &Path,
) -> Result<ConvertSummary> {
    let mappings = load_mappings(mapping)?;
    let header = read_destination_header(sample)?;
    let export = read_source(source, timezone)?;

    let converted = convert_export(&export, &header, &mappings);
    write_destination_file(output, &converted.header, &converted.rows)?;

    info!(
        rows = converted.rows.len(),
        sessions = converted.session_count,
        output = %output.display(),
        "conversion complete"
    );

    Ok(ConvertSummary {
        rows_written: converted.rows.len(),
        session_count: converted.session_count,
        unmapped_names: converted.unmapped_names,
    })
}

/// Pre-flight check: write every source row whose exercise name has no
/// mapping entry to `output`, in source shape and input order.
pub fn run_unmapped(
    source: &Path,
    mapping: &Path,
    timezone: Tz,
    output: &Path,
) -> Result<UnmappedSummary> {
    let mappings = ExerciseMappings::from_file(mapping)?;
    let export = read_source(source, timezone)?;

    let report = find_unmapped(&export, &mappings);
    write_source_rows_file(output, &report.header, &report.rows)?;

    info!(
        rows = report.rows.len(),
        unique_names = report.names.len(),
        output = %output.display(),
        "unmapped scan complete"
    );

    Ok(UnmappedSummary {
        rows_written: report.rows.len(),
        unique_names: report.names.len(),
    })
}

fn load_mappings(path: Option<&Path>) -> Result<ExerciseMappings> {
    match path {
        Some(path) => {
            let mappings = ExerciseMappings::from_file(path)?;
            info!(entries = mappings.len(), "loaded exercise mapping table");
            Ok(mappings)
        }
        None => {
            warn!("no mapping table supplied, exercise names pass through unchanged");
            Ok(ExerciseMappings::default())
        }
    }
}
