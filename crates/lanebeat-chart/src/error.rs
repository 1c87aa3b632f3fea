use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse chart JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart has no note list")]
    MissingNotes,
}
