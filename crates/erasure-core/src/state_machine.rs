//! Workflow state machine
//!
//! Pure transition function. The workflow feeds every state change through
//! [`next`]; anything not listed in the table is rejected and leaves the
//! state untouched.

use crate::error::{ErrorDetail, TransitionError};
use crate::types::{ConfirmationPolicy, WorkflowState};
use std::fmt;

/// Input to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Form submitted; `valid` when both fields are present
    Submit {
        /// Credential passed local validation
        valid: bool,
    },
    /// User confirmed the dialog
    Confirm,
    /// User cancelled the dialog or the countdown
    Cancel,
    /// Countdown timer fired
    Tick,
    /// Authentication rejected
    AuthFailed(ErrorDetail),
    /// Record deletion failed and was absorbed
    RecordSkipped,
    /// Principal deleted
    Deleted,
    /// Principal deletion failed
    DeleteFailed(ErrorDetail),
}

/// Payload-free event discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`WorkflowEvent::Submit`]
    Submit,
    /// See [`WorkflowEvent::Confirm`]
    Confirm,
    /// See [`WorkflowEvent::Cancel`]
    Cancel,
    /// See [`WorkflowEvent::Tick`]
    Tick,
    /// See [`WorkflowEvent::AuthFailed`]
    AuthFailed,
    /// See [`WorkflowEvent::RecordSkipped`]
    RecordSkipped,
    /// See [`WorkflowEvent::Deleted`]
    Deleted,
    /// See [`WorkflowEvent::DeleteFailed`]
    DeleteFailed,
}

impl WorkflowEvent {
    /// Discriminant
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Submit { .. } => EventKind::Submit,
            Self::Confirm => EventKind::Confirm,
            Self::Cancel => EventKind::Cancel,
            Self::Tick => EventKind::Tick,
            Self::AuthFailed(_) => EventKind::AuthFailed,
            Self::RecordSkipped => EventKind::RecordSkipped,
            Self::Deleted => EventKind::Deleted,
            Self::DeleteFailed(_) => EventKind::DeleteFailed,
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit { valid } => write!(f, "submit(valid={valid})"),
            Self::Confirm => f.write_str("confirm"),
            Self::Cancel => f.write_str("cancel"),
            Self::Tick => f.write_str("tick"),
            Self::AuthFailed(detail) => write!(f, "auth-failed({:?})", detail.kind),
            Self::RecordSkipped => f.write_str("record-skipped"),
            Self::Deleted => f.write_str("deleted"),
            Self::DeleteFailed(detail) => write!(f, "delete-failed({:?})", detail.kind),
        }
    }
}

/// Apply `event` to `state`
///
/// # Errors
/// `TransitionError` when the event is not valid in `state`.
pub fn next(
    state: &WorkflowState,
    event: WorkflowEvent,
    policy: ConfirmationPolicy,
) -> Result<WorkflowState, TransitionError> {
    use WorkflowState::{AwaitingConfirmation, CountingDown, Failed, Idle, InProgress, Succeeded};

    let to = match (state, &event) {
        (Idle | Failed(_) | Succeeded, WorkflowEvent::Submit { valid: true }) => {
            Some(AwaitingConfirmation)
        }
        (Idle | Failed(_) | Succeeded, WorkflowEvent::Submit { valid: false }) => {
            Some(Failed(ErrorDetail::validation()))
        }
        (AwaitingConfirmation, WorkflowEvent::Confirm) => match policy {
            ConfirmationPolicy::Immediate | ConfirmationPolicy::Countdown { seconds: 0 } => {
                Some(InProgress)
            }
            ConfirmationPolicy::Countdown { seconds } => Some(CountingDown(seconds)),
        },
        (AwaitingConfirmation | CountingDown(_), WorkflowEvent::Cancel) => Some(Idle),
        (CountingDown(seconds), WorkflowEvent::Tick) if *seconds > 1 => {
            Some(CountingDown(seconds - 1))
        }
        (CountingDown(_), WorkflowEvent::Tick)
        | (InProgress, WorkflowEvent::RecordSkipped) => Some(InProgress),
        (InProgress, WorkflowEvent::Deleted) => Some(Succeeded),
        (InProgress, WorkflowEvent::AuthFailed(detail) | WorkflowEvent::DeleteFailed(detail)) => {
            Some(Failed(detail.clone()))
        }
        _ => None,
    };

    to.ok_or_else(|| TransitionError {
        from: state.clone(),
        event,
    })
}

/// Events accepted in `state`
#[must_use]
pub fn allowed_events(state: &WorkflowState) -> Vec<EventKind> {
    use EventKind::{
        AuthFailed, Cancel, Confirm, DeleteFailed, Deleted, RecordSkipped, Submit, Tick,
    };
    match state {
        WorkflowState::Idle | WorkflowState::Failed(_) | WorkflowState::Succeeded => vec![Submit],
        WorkflowState::AwaitingConfirmation => vec![Confirm, Cancel],
        WorkflowState::CountingDown(_) => vec![Cancel, Tick],
        WorkflowState::InProgress => vec![AuthFailed, RecordSkipped, Deleted, DeleteFailed],
    }
}
