use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors for a run. Lines that don't match the expected shape are
/// not errors; they are skipped by the parser.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("could not read log file '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write output file '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write summary to stdout: {0}")]
    ConsoleWrite(#[source] io::Error),

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
