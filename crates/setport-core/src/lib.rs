pub mod error;
pub mod grouping;
pub mod ingestion;
pub mod mappings;
pub mod outputs;
pub mod pipeline;
pub mod projection;
pub mod types;
pub mod unmapped;

pub use error::{ConvertError, Result};
pub use grouping::group_sessions;
pub use ingestion::{read_source, read_source_from_reader};
pub use mappings::ExerciseMappings;
pub use pipeline::{convert_export, run_convert, run_unmapped, ConvertSummary, UnmappedSummary};
pub use projection::{read_destination_header, Field};
pub use types::{SetRecord, SourceExport, WorkoutSession};
pub use unmapped::{find_unmapped, UnmappedReport};
