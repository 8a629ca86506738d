//! Core types for the deletion workflow
//!
//! Defines:
//! - User-supplied credentials
//! - Principals and record keys
//! - Workflow state and its observable snapshot
//! - Workflow configuration

use crate::error::{ErrorDetail, WorkflowError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Email and password entered by the user
///
/// Mutable until submission, cleared after a successful deletion.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credential {
    /// Create a credential
    #[inline]
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields present
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }

    /// Both fields empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.password.is_empty()
    }

    /// Reset both fields
    pub fn clear(&mut self) {
        self.email.clear();
        self.password.clear();
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Backend identifier of an authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Create from raw uid
    #[inline]
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Raw uid
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session token issued on authentication
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token, for authorization headers only
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Authenticated identity handle
///
/// Lives only for the duration of one deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier, also the record key
    pub id: PrincipalId,
    /// Email the principal signed in with
    pub email: String,
    /// Authorization context for follow-up calls
    pub session: SessionToken,
}

impl Principal {
    /// Create principal
    #[inline]
    #[must_use]
    pub fn new(id: PrincipalId, email: impl Into<String>, session: SessionToken) -> Self {
        Self {
            id,
            email: email.into(),
            session,
        }
    }
}

/// Key of a per-user document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Collection holding user documents
    pub collection: String,
    /// Document id
    pub id: String,
}

impl RecordKey {
    /// Key of the document owned by `principal`
    #[inline]
    #[must_use]
    pub fn for_principal(collection: impl Into<String>, principal: &Principal) -> Self {
        Self {
            collection: collection.into(),
            id: principal.id.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Workflow state
///
/// Exactly one instance per active attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Waiting for input
    #[default]
    Idle,
    /// Confirmation dialog open
    AwaitingConfirmation,
    /// Auto-confirm countdown running
    CountingDown(u32),
    /// Destructive sequence running
    InProgress,
    /// Account removed
    Succeeded,
    /// Attempt failed
    Failed(ErrorDetail),
}

impl WorkflowState {
    /// Terminal for the current attempt
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Timer or backend calls outstanding
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::CountingDown(_) | Self::InProgress)
    }

    /// Seconds left on the countdown
    #[inline]
    #[must_use]
    pub fn seconds_remaining(&self) -> Option<u32> {
        match self {
            Self::CountingDown(seconds) => Some(*seconds),
            _ => None,
        }
    }

    /// Failure detail
    #[inline]
    #[must_use]
    pub fn error_detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Failed(detail) => Some(detail),
            _ => None,
        }
    }

    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation => "awaiting-confirmation",
            Self::CountingDown(_) => "counting-down",
            Self::InProgress => "in-progress",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountingDown(seconds) => write!(f, "counting-down({seconds})"),
            Self::Failed(detail) => write!(f, "failed({:?})", detail.kind),
            other => f.write_str(other.name()),
        }
    }
}

/// Tone of a banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    /// Deletion completed
    Success,
    /// Attempt failed
    Error,
}

/// Message the shell renders under the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Success or error
    pub tone: BannerTone,
    /// Short heading
    pub title: String,
    /// Body text
    pub text: String,
}

impl Banner {
    /// Banner shown after a completed deletion
    #[must_use]
    pub fn success() -> Self {
        Self {
            tone: BannerTone::Success,
            title: "Account Deleted".to_string(),
            text: "Your account and all associated data have been permanently deleted."
                .to_string(),
        }
    }

    /// Banner for a failure
    #[must_use]
    pub fn error(detail: &ErrorDetail) -> Self {
        Self {
            tone: BannerTone::Error,
            title: detail.title.clone(),
            text: detail.message.clone(),
        }
    }
}

/// Observable view of the workflow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowSnapshot {
    /// Current state
    pub state: WorkflowState,
    /// Banner for the shell, if any
    pub banner: Option<Banner>,
}

impl WorkflowSnapshot {
    /// Snapshot derived from a state
    #[must_use]
    pub fn of(state: &WorkflowState) -> Self {
        let banner = match state {
            WorkflowState::Succeeded => Some(Banner::success()),
            WorkflowState::Failed(detail) => Some(Banner::error(detail)),
            _ => None,
        };
        Self {
            state: state.clone(),
            banner,
        }
    }

    /// Failure detail, if failed
    #[inline]
    #[must_use]
    pub fn error_detail(&self) -> Option<&ErrorDetail> {
        self.state.error_detail()
    }
}

/// How a confirmed deletion is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    /// Run as soon as the user confirms
    Immediate,
    /// Run after a cancellable countdown
    Countdown {
        /// Countdown length
        seconds: u32,
    },
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::Immediate
    }
}

/// Default countdown length
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;

/// Collection holding per-user documents
pub const DEFAULT_RECORD_COLLECTION: &str = "users";

/// Workflow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Confirmation policy
    pub confirmation: ConfirmationPolicy,
    /// Countdown tick period in milliseconds
    pub tick_interval_ms: u64,
    /// Collection of the user record
    pub record_collection: String,
}

impl WorkflowConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With confirmation policy
    #[inline]
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: ConfirmationPolicy) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// With countdown of `seconds`
    #[inline]
    #[must_use]
    pub fn with_countdown(self, seconds: u32) -> Self {
        self.with_confirmation(ConfirmationPolicy::Countdown { seconds })
    }

    /// With tick period
    #[inline]
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With record collection
    #[inline]
    #[must_use]
    pub fn with_record_collection(mut self, collection: impl Into<String>) -> Self {
        self.record_collection = collection.into();
        self
    }

    /// Tick period
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check configuration
    ///
    /// # Errors
    /// - `WorkflowError::Config` for a zero-length countdown, a zero tick
    ///   period or an empty collection name
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if let ConfirmationPolicy::Countdown { seconds: 0 } = self.confirmation {
            return Err(WorkflowError::Config(
                "countdown must last at least one second".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(WorkflowError::Config(
                "tick interval must be non-zero".to_string(),
            ));
        }
        if self.record_collection.trim().is_empty() {
            return Err(WorkflowError::Config(
                "record collection must be named".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            confirmation: ConfirmationPolicy::Immediate,
            tick_interval_ms: 1000,
            record_collection: DEFAULT_RECORD_COLLECTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_hides_password() {
        let credential = Credential::new("a@b.com", "hunter2");
        let printed = format!("{credential:?}");
        assert!(printed.contains("a@b.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn credential_completeness() {
        assert!(Credential::new("a@b.com", "x").is_complete());
        assert!(!Credential::new("a@b.com", "").is_complete());
        assert!(!Credential::new("   ", "x").is_complete());
        assert!(!Credential::default().is_complete());
    }

    #[test]
    fn record_key_uses_principal_id() {
        let principal = Principal::new(PrincipalId::new("uid-1"), "a@b.com", SessionToken::new("t"));
        let key = RecordKey::for_principal("users", &principal);
        assert_eq!(key.id, "uid-1");
        assert_eq!(key.to_string(), "users/uid-1");
    }

    #[test]
    fn config_rejects_zero_countdown() {
        assert!(WorkflowConfig::new().with_countdown(0).validate().is_err());
        assert!(WorkflowConfig::new().with_countdown(5).validate().is_ok());
        assert!(WorkflowConfig::new()
            .with_tick_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn config_deserializes_countdown_policy() {
        let config: WorkflowConfig = serde_json::from_str(
            r#"{"confirmation":{"mode":"countdown","seconds":5}}"#,
        )
        .unwrap();
        assert_eq!(config.confirmation, ConfirmationPolicy::Countdown { seconds: 5 });
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.record_collection, "users");
    }

    #[test]
    fn snapshot_banner_follows_state() {
        assert!(WorkflowSnapshot::of(&WorkflowState::Idle).banner.is_none());
        let done = WorkflowSnapshot::of(&WorkflowState::Succeeded);
        assert_eq!(done.banner.unwrap().tone, BannerTone::Success);
    }
}
