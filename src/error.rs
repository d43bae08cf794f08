//! Error types for review-upload

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while preparing, submitting or uploading a review
#[derive(Debug, Error)]
pub enum Error {
    /// A filesystem operation failed
    #[error("failed to {op} {}: {source}", path.display())]
    Filesystem {
        /// Operation that failed (e.g. "copy", "create directory")
        op: &'static str,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The file selected for review does not exist
    #[error("source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// No source file was selected
    #[error("no file selected for review")]
    NoSourceFile,

    /// A publish template could not be parsed or rendered
    #[error("template error: {0}")]
    Template(String),

    /// Every candidate version path is already taken
    #[error("no free version left, {} already exists", path.display())]
    VersionsExhausted {
        /// The last candidate that was found on disk
        path: PathBuf,
    },

    /// The context lacks a part needed to build publish fields
    #[error("context has no {0}")]
    IncompleteContext(&'static str),

    /// Configuration could not be loaded or is invalid
    #[error("config error: {0}")]
    Config(String),

    /// The tracking service rejected a request or returned unexpected data
    #[error("tracking service error: {0}")]
    Tracking(String),

    /// An entity lookup came back empty
    #[error("{entity_type} {id} not found")]
    EntityNotFound {
        /// Entity type that was queried
        entity_type: String,
        /// Entity id that was queried
        id: u64,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A hook raised an error
    #[error("{hook} hook failed: {message}")]
    Hook {
        /// Hook method name
        hook: &'static str,
        /// Error message reported by the hook
        message: String,
    },

    /// Background work failed or could not be queued
    #[error("{0}")]
    Worker(String),

    /// A state transition that the submission state machine forbids
    #[error("cannot move submission from {from} to {to}")]
    InvalidTransition {
        /// Current state
        from: String,
        /// Requested state
        to: String,
    },

    /// A submission is already running in this session
    #[error("a submission is already in progress")]
    SubmissionInProgress,

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// User interaction was cancelled or failed
    #[error("{0}")]
    Interaction(String),
}

/// Result type alias for review-upload operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a hook error from any displayable message
    pub fn hook(hook: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Hook {
            hook,
            message: message.to_string(),
        }
    }
}
