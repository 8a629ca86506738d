//! Account deletion workflow
//!
//! Owns the credential, drives the confirm → countdown/cancel → execute
//! state machine and runs the destructive sequence:
//!
//! 1. Authenticate with the identity service
//! 2. Delete the user record (failures are absorbed)
//! 3. Delete the principal
//!
//! Once step 1 is issued the sequence is not interruptible.

use crate::countdown::{tick_every, CountdownTask, TickFlow};
use crate::error::{ErrorDetail, WorkflowError};
use crate::services::{IdentityService, RecordStore};
use crate::state_machine::{self, WorkflowEvent};
use crate::types::{Credential, RecordKey, WorkflowConfig, WorkflowSnapshot, WorkflowState};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Account deletion workflow
///
/// One instance per mounted deletion form. Dropping it releases a pending
/// countdown; a deletion already in progress runs to completion.
pub struct AccountDeletionWorkflow {
    shared: Arc<Shared>,
}

struct Shared {
    config: WorkflowConfig,
    identity: Arc<dyn IdentityService>,
    records: Arc<dyn RecordStore>,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<WorkflowSnapshot>,
}

#[derive(Default)]
struct Inner {
    state: WorkflowState,
    credential: Credential,
    countdown: Option<CountdownTask>,
}

impl AccountDeletionWorkflow {
    /// Create workflow with injected services
    ///
    /// # Errors
    /// - `WorkflowError::Config` if `config` is invalid
    pub fn new(
        config: WorkflowConfig,
        identity: Arc<dyn IdentityService>,
        records: Arc<dyn RecordStore>,
    ) -> Result<Self, WorkflowError> {
        config.validate()?;
        let (snapshot_tx, _) = watch::channel(WorkflowSnapshot::default());
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                identity,
                records,
                inner: Mutex::new(Inner::default()),
                snapshot_tx,
            }),
        })
    }

    /// Submit the form
    ///
    /// Incomplete credentials fail locally without contacting any service.
    /// Complete credentials open the confirmation dialog.
    ///
    /// # Errors
    /// - `WorkflowError::IllegalTransition` while a dialog, countdown or
    ///   deletion is already active
    pub fn submit(&self, credential: Credential) -> Result<WorkflowState, WorkflowError> {
        let mut inner = self.shared.inner.lock();
        let valid = credential.is_complete();
        let state = self
            .shared
            .apply(&mut inner, WorkflowEvent::Submit { valid })?;
        inner.credential = credential;
        if valid {
            tracing::info!("Deletion requested for {}", inner.credential.email);
        } else {
            tracing::info!("Deletion request rejected: missing email or password");
        }
        Ok(state)
    }

    /// Confirm the dialog
    ///
    /// With an immediate policy this runs the deletion on its own task and
    /// resolves to the final state; dropping the returned future does not
    /// stop the deletion. With a countdown policy it starts the timer and
    /// resolves to `CountingDown`; the deletion runs when the countdown
    /// expires.
    ///
    /// # Errors
    /// - `WorkflowError::IllegalTransition` unless awaiting confirmation
    pub async fn confirm(&self) -> Result<WorkflowState, WorkflowError> {
        let credential = {
            let mut inner = self.shared.inner.lock();
            match self.shared.apply(&mut inner, WorkflowEvent::Confirm)? {
                WorkflowState::InProgress => inner.credential.clone(),
                state => {
                    tracing::info!("Deletion confirmed, countdown started: {}", state);
                    inner.countdown = Some(self.spawn_countdown());
                    return Ok(state);
                }
            }
        };

        let shared = Arc::clone(&self.shared);
        let sequence = tokio::spawn(async move { shared.execute(credential).await });
        match sequence.await {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::error!("Deletion task failed: {}", e);
                Ok(self.state())
            }
        }
    }

    /// Cancel the dialog or the countdown
    ///
    /// No backend call is made. Has no effect once the deletion has started.
    ///
    /// # Errors
    /// - `WorkflowError::IllegalTransition` unless awaiting confirmation or
    ///   counting down
    pub fn cancel(&self) -> Result<WorkflowState, WorkflowError> {
        let mut inner = self.shared.inner.lock();
        let state = self.shared.apply(&mut inner, WorkflowEvent::Cancel)?;
        if let Some(task) = inner.countdown.take() {
            task.cancel();
        }
        tracing::info!("Deletion cancelled");
        Ok(state)
    }

    /// Current observable value
    #[must_use]
    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.shared.inner.lock().state.clone()
    }

    /// Credential as last submitted; empty after a successful deletion
    #[must_use]
    pub fn credential(&self) -> Credential {
        self.shared.inner.lock().credential.clone()
    }

    /// Workflow configuration
    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.shared.config
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Wait until no countdown or deletion is outstanding
    pub async fn wait_until_settled(&self) -> WorkflowSnapshot {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|snapshot| !snapshot.state.is_busy()).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }

    fn spawn_countdown(&self) -> CountdownTask {
        let shared = Arc::clone(&self.shared);
        let period = shared.config.tick_interval();
        CountdownTask::spawn(async move {
            let mut armed = None;
            tick_every(period, || {
                let mut inner = shared.inner.lock();
                match shared.apply(&mut inner, WorkflowEvent::Tick) {
                    Ok(WorkflowState::InProgress) => {
                        if let Some(task) = inner.countdown.take() {
                            task.detach();
                        }
                        armed = Some(inner.credential.clone());
                        TickFlow::Stop
                    }
                    Ok(_) => TickFlow::Continue,
                    Err(_) => TickFlow::Stop,
                }
            })
            .await;

            if let Some(credential) = armed {
                shared.execute(credential).await;
            }
        })
    }
}

impl Drop for AccountDeletionWorkflow {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        if let Some(task) = inner.countdown.take() {
            task.cancel();
            if matches!(inner.state, WorkflowState::CountingDown(_)) {
                let _ = self.shared.apply(&mut inner, WorkflowEvent::Cancel);
            }
            tracing::debug!("Pending countdown released on teardown");
        }
    }
}

impl fmt::Debug for AccountDeletionWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDeletionWorkflow")
            .field("config", &self.shared.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Shared {
    /// Feed `event` through the state machine and publish the result
    fn apply(
        &self,
        inner: &mut Inner,
        event: WorkflowEvent,
    ) -> Result<WorkflowState, WorkflowError> {
        let from = inner.state.name();
        let to = state_machine::next(&inner.state, event, self.config.confirmation).map_err(
            |e| {
                tracing::debug!("Rejected {}", e);
                e
            },
        )?;
        tracing::debug!("Transition {} -> {}", from, to);
        inner.state = to.clone();
        self.snapshot_tx.send_replace(WorkflowSnapshot::of(&to));
        Ok(to)
    }

    /// Run the three-step sequence; always ends in `Succeeded` or `Failed`
    async fn execute(&self, credential: Credential) -> WorkflowState {
        tracing::info!("Authenticating {} before deletion", credential.email);
        let principal = match self.identity.authenticate(&credential).await {
            Ok(principal) => principal,
            Err(e) => {
                tracing::error!("Authentication failed: {}", e);
                return self.settle(WorkflowEvent::AuthFailed(ErrorDetail::from(&e)));
            }
        };

        let key = RecordKey::for_principal(&self.config.record_collection, &principal);
        match self.records.delete_record(&key, &principal).await {
            Ok(()) => tracing::info!("Deleted record {}", key),
            Err(e) => {
                tracing::warn!("Record {} may not exist or was already deleted: {}", key, e);
                self.settle(WorkflowEvent::RecordSkipped);
            }
        }

        match self.identity.delete_identity(&principal).await {
            Ok(()) => {
                tracing::info!("Deleted principal {}", principal.id);
                self.settle(WorkflowEvent::Deleted)
            }
            Err(e) => {
                tracing::error!("Principal deletion failed: {}", e);
                self.settle(WorkflowEvent::DeleteFailed(ErrorDetail::from(&e)))
            }
        }
    }

    fn settle(&self, event: WorkflowEvent) -> WorkflowState {
        let mut inner = self.inner.lock();
        match self.apply(&mut inner, event) {
            Ok(state) => {
                if state == WorkflowState::Succeeded {
                    inner.credential.clear();
                }
                state
            }
            Err(_) => inner.state.clone(),
        }
    }
}
