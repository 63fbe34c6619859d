//! Error types shared by the record store, renderer and workflow.

use std::path::PathBuf;

/// Stable classification of a [`RecordError`].
///
/// The CLI maps each kind to its own exit code, so the set is part of the
/// public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Storage,
    IdCollision,
    Template,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Storage => "storage",
            ErrorKind::IdCollision => "id_collision",
            ErrorKind::Template => "template",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// No record file exists for the id.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// Bad input or an attempt to change an immutable field.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// I/O failure or a record file that cannot be decoded.
    #[error("storage error at {}: {message}", path.display())]
    Storage {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Another writer created the same id first.
    #[error("id collision: record {id} already exists")]
    IdCollision { id: String },

    /// Every daily sequence number 001..=999 is taken.
    #[error("no free sequence number left for {date} (all 999 taken)")]
    CapacityExceeded { date: String },

    #[error("template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("template error in {template}: {message}")]
    Template { template: String, message: String },
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Storage { .. } | Self::CapacityExceeded { .. } => ErrorKind::Storage,
            Self::IdCollision { .. } => ErrorKind::IdCollision,
            Self::TemplateNotFound { .. } | Self::Template { .. } => ErrorKind::Template,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: format!("corrupted record file: {}", message.into()),
            source: None,
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Failure to load or interpret the configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);
