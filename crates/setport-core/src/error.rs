use chrono::NaiveDateTime;
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("source file is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("source row {line} is missing required field '{column}'")]
    MissingField { line: usize, column: &'static str },

    #[error("source row {line} field '{column}' invalid: {message}")]
    InvalidField {
        line: usize,
        column: &'static str,
        message: String,
    },

    #[error("source row {line} local time {local} does not exist in timezone {timezone} (DST gap)")]
    NonexistentLocalTime {
        line: usize,
        local: NaiveDateTime,
        timezone: Tz,
    },

    #[error("destination sample file has no header row")]
    EmptyDestinationHeader,

    #[error("mapping table is not valid TOML: {0}")]
    MappingTable(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
