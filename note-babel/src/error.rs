//! Error types for format and import operations

use std::fmt;

/// How loudly a user-facing error should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in registry
    FormatNotFound(String),
    /// Error during parsing
    ParseError(String),
    /// Error during serialization
    SerializationError(String),
    /// Format does not support the operation
    NotSupported(String),
    /// Content whose type has no text rendering
    UnsupportedContent { user_msg: String, severity: Severity },
}

impl FormatError {
    /// Message suitable for showing to the user, when the error carries one
    pub fn user_msg(&self) -> Option<&str> {
        match self {
            FormatError::UnsupportedContent { user_msg, .. } => Some(user_msg),
            _ => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FormatError::UnsupportedContent { severity, .. } => *severity,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            FormatError::NotSupported(msg) => write!(f, "Operation not supported: {msg}"),
            FormatError::UnsupportedContent { user_msg, severity } => {
                write!(f, "Unsupported content ({severity}): {user_msg}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Error reported by the storage collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Storage error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Errors that abort an import
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The store rejected a note; `note_ids` were created before the failure
    Storage {
        note_ids: Vec<uuid::Uuid>,
        message: String,
    },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Storage { note_ids, message } => write!(
                f,
                "Import stopped after {} note(s): {message}",
                note_ids.len()
            ),
        }
    }
}

impl std::error::Error for ImportError {}
