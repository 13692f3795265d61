use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, StringRecord, WriterBuilder};

use crate::error::Result;
use crate::ingestion::SOURCE_DELIMITER;
use crate::projection::Field;

/// Writes the destination CSV: sample-defined header first, then one row per
/// source set record. Text fields are quoted, numeric fields are bare, which
/// is what the target app's importer expects.
pub fn write_destination<W: Write>(writer: W, header: &[String], rows: &[Vec<Field>]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(SOURCE_DELIMITER)
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);

    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.write_record(row.iter().map(|field| field.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_destination_file(path: &Path, header: &[String], rows: &[Vec<Field>]) -> Result<()> {
    let file = File::create(path)?;
    write_destination(file, header, rows)
}

/// Writes rows back out in the source file's own shape (same header, same
/// field order). Used for the unmapped-exercise report.
pub fn write_source_rows<W: Write>(
    writer: W,
    header: &StringRecord,
    rows: &[StringRecord],
) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(SOURCE_DELIMITER)
        .from_writer(writer);

    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_source_rows_file(
    path: &Path,
    header: &StringRecord,
    rows: &[StringRecord],
) -> Result<()> {
    let file = File::create(path)?;
    write_source_rows(file, header, rows)
}
