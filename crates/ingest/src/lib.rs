mod aggregate;
mod parser;
mod paths;
mod pipeline;
mod types;

pub use aggregate::{daily_increments, session_increments};
pub use parser::{parse_line, read_log_lines};
pub use paths::default_log_path;
pub use pipeline::{ingest_log_file, run_ingestion};
pub use types::{DEFAULT_BATCH_SIZE, IngestError, IngestOptions, IngestStats, Result};
