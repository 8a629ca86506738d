//! Error types for the deletion workflow
//!
//! Provides:
//! - The closed `ErrorKind` taxonomy shown to users
//! - Boundary translation of raw identity backend codes
//! - Record store failures (absorbed, never surfaced)
//! - Workflow and state machine errors

use crate::state_machine::WorkflowEvent;
use crate::types::WorkflowState;

/// Failure kind surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing email or password
    Validation,
    /// No account for this email
    NotFound,
    /// Wrong password
    Unauthorized,
    /// Malformed email
    InvalidInput,
    /// Rate limited
    Throttled,
    /// Session too old for a destructive call
    ReauthRequired,
    /// Backend unreachable
    Network,
    /// Anything unrecognized
    Unknown,
}

/// Coarse error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Local, never reaches a backend
    Validation,
    /// Rejected by the identity backend
    Authentication,
    /// Connectivity failure
    Network,
    /// Unclassified
    Unknown,
}

impl ErrorKind {
    /// Taxonomy bucket
    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::Validation => ErrorCategory::Validation,
            Self::NotFound
            | Self::Unauthorized
            | Self::InvalidInput
            | Self::Throttled
            | Self::ReauthRequired => ErrorCategory::Authentication,
            Self::Network => ErrorCategory::Network,
            Self::Unknown => ErrorCategory::Unknown,
        }
    }

    /// User-facing heading
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Validation => "Missing Information",
            Self::NotFound => "Account Not Found",
            Self::Unauthorized => "Incorrect Password",
            Self::InvalidInput => "Invalid Email",
            Self::Throttled => "Too Many Attempts",
            Self::ReauthRequired => "Sign In Again",
            Self::Network => "Connection Problem",
            Self::Unknown => "Deletion Failed",
        }
    }

    /// User-facing body text
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Validation => "Please enter both email and password.",
            Self::NotFound => "No account found with this email address.",
            Self::Unauthorized => "Incorrect password. Please try again.",
            Self::InvalidInput => "Invalid email address format.",
            Self::Throttled => "Too many failed attempts. Please try again later.",
            Self::ReauthRequired => {
                "This operation requires recent authentication. Please sign in again."
            }
            Self::Network => "Could not reach the server. Check your connection and try again.",
            Self::Unknown => "An error occurred while deleting your account.",
        }
    }
}

/// What the user sees for a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    /// Failure kind
    pub kind: ErrorKind,
    /// Heading
    pub title: String,
    /// Body
    pub message: String,
}

impl ErrorDetail {
    /// Detail for a kind, from the fixed table
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            message: kind.message().to_string(),
        }
    }

    /// Missing email or password
    #[inline]
    #[must_use]
    pub fn validation() -> Self {
        Self::from_kind(ErrorKind::Validation)
    }

    /// Taxonomy bucket
    #[inline]
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl From<&IdentityError> for ErrorDetail {
    fn from(error: &IdentityError) -> Self {
        Self::from_kind(error.kind())
    }
}

/// Identity backend failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// No principal for this email
    #[error("principal not found")]
    NotFound,

    /// Credential rejected
    #[error("wrong credential")]
    Unauthorized,

    /// Malformed email
    #[error("malformed email")]
    InvalidInput,

    /// Rate limited
    #[error("rate limited")]
    Throttled,

    /// Fresh authentication required
    #[error("recent authentication required")]
    ReauthRequired,

    /// Transport failure
    #[error("network failure: {0}")]
    Network(String),

    /// Unrecognized backend code
    #[error("unrecognized identity error: {code}")]
    Unknown {
        /// Raw code as reported by the backend
        code: String,
    },
}

impl IdentityError {
    /// Translate a raw backend code
    ///
    /// Accepts SDK style codes (`auth/wrong-password`) and REST style codes
    /// (`INVALID_PASSWORD`, `TOO_MANY_ATTEMPTS_TRY_LATER : detail`).
    #[must_use]
    pub fn from_code(raw: &str) -> Self {
        let code = raw.split(" : ").next().unwrap_or(raw).trim();
        match code {
            "auth/user-not-found" | "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::NotFound,
            "auth/wrong-password"
            | "auth/invalid-credential"
            | "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS" => Self::Unauthorized,
            "auth/invalid-email" | "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidInput,
            "auth/too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::Throttled,
            "auth/requires-recent-login"
            | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN"
            | "TOKEN_EXPIRED"
            | "INVALID_ID_TOKEN" => Self::ReauthRequired,
            "auth/network-request-failed" => Self::Network(code.to_string()),
            other => Self::Unknown {
                code: other.to_string(),
            },
        }
    }

    /// User-facing kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::InvalidInput => ErrorKind::InvalidInput,
            Self::Throttled => ErrorKind::Throttled,
            Self::ReauthRequired => ErrorKind::ReauthRequired,
            Self::Network(_) => ErrorKind::Network,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }
}

/// Record store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordStoreError {
    /// Document absent
    #[error("record not found")]
    NotFound,

    /// Caller may not delete the document
    #[error("permission denied")]
    PermissionDenied,

    /// Transport failure
    #[error("network failure: {0}")]
    Network(String),

    /// Backend reported an error
    #[error("record store error: {0}")]
    Backend(String),
}

/// Illegal state machine transition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition: {event} from {from}")]
pub struct TransitionError {
    /// State the event arrived in
    pub from: WorkflowState,
    /// Rejected event
    pub event: WorkflowEvent,
}

/// Workflow operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// Operation not valid in the current state; nothing happened
    #[error("{0}")]
    IllegalTransition(#[from] TransitionError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl WorkflowError {
    /// Operation was ignored because of the current state
    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::IllegalTransition(_))
    }
}
