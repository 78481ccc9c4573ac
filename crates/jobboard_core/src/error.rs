use std::fmt;

use thiserror::Error;

/// Backend code for a repeated application.
pub const CODE_ALREADY_APPLIED: &str = "ALREADY_APPLIED";
/// Backend code for an application against a closed posting.
pub const CODE_JOB_CLOSED: &str = "JOB_CLOSED";
/// Code attached to a save rejected because the job is already saved.
pub const CODE_ALREADY_SAVED: &str = "ALREADY_SAVED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// The resource already exists remotely or in the local mirror.
    DuplicateResource,
    /// Another action on the same id is still Pending.
    DuplicateInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Auth,
    Validation,
    Conflict(ConflictKind),
    NotFound,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Auth => write!(f, "auth error"),
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Conflict(ConflictKind::DuplicateResource) => {
                write!(f, "conflict (duplicate resource)")
            }
            ErrorKind::Conflict(ConflictKind::DuplicateInFlight) => {
                write!(f, "conflict (duplicate in flight)")
            }
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Unknown => write!(f, "unknown error"),
        }
    }
}

/// A rejected outcome, either classified from an HTTP response or raised
/// locally by the synchronization policy before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {}", .message.as_deref().unwrap_or("no details"))]
pub struct SyncError {
    pub kind: ErrorKind,
    pub code: Option<String>,
    pub message: Option<String>,
    pub field_errors: Vec<String>,
}

impl SyncError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            code: None,
            message: None,
            field_errors: Vec::new(),
        }
    }

    pub fn duplicate_in_flight() -> Self {
        Self::new(ErrorKind::Conflict(ConflictKind::DuplicateInFlight))
            .with_message("an action on this item is still pending")
    }

    pub fn duplicate_resource(code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict(ConflictKind::DuplicateResource))
            .with_code(code)
            .with_message(message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound).with_message(message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_field_errors(mut self, field_errors: Vec<String>) -> Self {
        self.field_errors = field_errors;
        self
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    pub fn message_contains(&self, needle: &str) -> bool {
        self.message
            .as_deref()
            .is_some_and(|message| message.to_ascii_lowercase().contains(needle))
    }
}
