use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the processing engine and its readers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Path extension does not map to any supported model file kind.
    #[error("unsupported model file kind: {extension:?}")]
    UnsupportedFileKind { extension: String },

    /// An external reader failed; no model is added in this case.
    #[error("failed to load geometry from {path}: {reason}")]
    GeometryLoad { path: PathBuf, reason: String },
}

impl EngineError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::GeometryLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
