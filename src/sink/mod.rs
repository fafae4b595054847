//! Date-rotated log files.
//!
//! One file per day, named `<prefix>_<YYYY_MM_DD><extension>`. A new file
//! starts with a header block, and its creation is when expired files of the
//! same prefix are collected for deletion.

mod file;
mod header;
mod retention;
mod writer;

pub use file::{FileSink, FlushOutcome};
pub use header::HeaderInfo;
pub use retention::{LogFileMatcher, is_expired};
pub(crate) use retention::spawn_removals;
pub use writer::AppendFileWriter;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Log path exists but is not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Flush task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid log file prefix: {0}")]
    Pattern(#[from] regex::Error),
}
