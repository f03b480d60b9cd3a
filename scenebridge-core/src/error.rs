//! Export error types

use std::path::PathBuf;

use crate::textures::TextureError;
use crate::types::{ConfigError, SceneGraphError};

/// Errors that abort an export
///
/// None of these leave a partially written scene behind: the target file is
/// only written once the whole document has been built.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(
        "Cannot export into a scene with format {existing}: the selected engine version writes format {requested}"
    )]
    FormatMismatch { existing: u32, requested: u32 },

    #[error("Malformed scene file {}: {reason} (line {line})", path.display())]
    MalformedExistingFile {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid mesh data on '{object}': {reason}")]
    InvalidMesh { object: String, reason: String },

    #[error("Invalid scene description: {0}")]
    Scene(#[from] SceneGraphError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to save texture: {0}")]
    Texture(TextureError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Parse failure before a file path is attached
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} (line {line})")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn with_path(self, path: impl Into<PathBuf>) -> ExportError {
        ExportError::MalformedExistingFile {
            path: path.into(),
            line: self.line,
            reason: self.reason,
        }
    }
}
