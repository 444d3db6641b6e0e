use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest format error in {} (line {line}): {msg}", .path.display())]
    ManifestFormat {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("genepanels format error (line {line}): {msg}")]
    GenepanelsFormat { line: usize, msg: String },

    #[error("invalid assay config: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid file pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("`{command}` failed: {msg}")]
    Platform { command: String, msg: String },
}

pub type Result<T> = std::result::Result<T, ReportsError>;
