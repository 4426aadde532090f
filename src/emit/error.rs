//! Error types for artifact rendering and writing.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while turning a plan into files.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The setup template failed to render.
    #[error("Template error: {0}")]
    Template(String),

    /// The plan could not be serialized.
    #[error("Failed to serialize plan: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An artifact could not be written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
