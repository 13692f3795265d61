use csv::StringRecord;
use tracing::info;

use crate::mappings::ExerciseMappings;
use crate::types::SourceExport;

/// Result of the pre-flight unmapped-name scan.
#[derive(Debug, Clone)]
pub struct UnmappedReport {
    /// Source header, so the rows can be written back in source shape.
    pub header: StringRecord,
    /// Every source row whose exercise name lacks a mapping entry, in input
    /// order. Full rows, not just names, so the user can inspect context.
    pub rows: Vec<StringRecord>,
    /// Distinct unmapped names in first-appearance order.
    pub names: Vec<String>,
}

impl UnmappedReport {
    pub fn is_clean(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Scans the ingested export for exercise names with no mapping entry.
/// Read-only over both inputs; once every name has an entry the report is
/// empty and stays empty on re-runs.
pub fn find_unmapped(export: &SourceExport, mappings: &ExerciseMappings) -> UnmappedReport {
    let mut rows = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for (record, raw) in export.records.iter().zip(&export.raw_rows) {
        if mappings.contains(&record.exercise) {
            continue;
        }
        if !names.iter().any(|name| name == &record.exercise) {
            names.push(record.exercise.clone());
        }
        rows.push(raw.clone());
    }

    info!(
        unmapped_rows = rows.len(),
        unique_names = names.len(),
        "scanned export for unmapped exercise names"
    );

    UnmappedReport {
        header: export.header.clone(),
        rows,
        names,
    }
}
