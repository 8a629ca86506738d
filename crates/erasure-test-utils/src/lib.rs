//! Testing utilities for the Erasure workspace
//!
//! In-memory identity and record backends with call recording and failure
//! injection, plus fixtures for building workflows against them.

#![allow(missing_docs)]

use erasure_core::{
    AccountDeletionWorkflow, Credential, IdentityError, IdentityService, Principal, PrincipalId,
    RecordKey, RecordStore, RecordStoreError, SessionToken, WorkflowConfig,
    DEFAULT_RECORD_COLLECTION,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Demo account seeded by [`seeded_backends`]
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo";
pub const DEMO_UID: &str = "demo-uid";

/// Call observed by [`InMemoryIdentity`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    Authenticate { email: String },
    DeleteIdentity { id: PrincipalId },
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
}

/// Identity backend held in memory
#[derive(Debug, Default)]
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    calls: Mutex<Vec<IdentityCall>>,
    authenticate_failure: Mutex<Option<IdentityError>>,
    delete_failure: Mutex<Option<IdentityError>>,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, uid: &str) -> Self {
        self.accounts.lock().insert(
            email.to_string(),
            Account {
                uid: uid.to_string(),
                password: password.to_string(),
            },
        );
        self
    }

    /// Delay every call
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = Some(latency);
        self
    }

    /// Fail every authentication with `error`
    pub fn fail_authenticate(&self, error: IdentityError) {
        *self.authenticate_failure.lock() = Some(error);
    }

    /// Fail every principal deletion with `error`
    pub fn fail_delete(&self, error: IdentityError) {
        *self.delete_failure.lock() = Some(error);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<IdentityCall> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.lock().contains_key(email)
    }

    async fn delay(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl IdentityService for InMemoryIdentity {
    async fn authenticate(&self, credential: &Credential) -> Result<Principal, IdentityError> {
        self.calls.lock().push(IdentityCall::Authenticate {
            email: credential.email.clone(),
        });
        self.delay().await;

        if let Some(error) = self.authenticate_failure.lock().clone() {
            return Err(error);
        }
        if !credential.email.contains('@') {
            return Err(IdentityError::InvalidInput);
        }

        let accounts = self.accounts.lock();
        let account = accounts
            .get(&credential.email)
            .ok_or(IdentityError::NotFound)?;
        if account.password != credential.password {
            return Err(IdentityError::Unauthorized);
        }

        Ok(Principal::new(
            PrincipalId::new(account.uid.clone()),
            credential.email.clone(),
            SessionToken::new(format!("session-{}", account.uid)),
        ))
    }

    async fn delete_identity(&self, principal: &Principal) -> Result<(), IdentityError> {
        self.calls.lock().push(IdentityCall::DeleteIdentity {
            id: principal.id.clone(),
        });
        self.delay().await;

        if let Some(error) = self.delete_failure.lock().clone() {
            return Err(error);
        }

        let mut accounts = self.accounts.lock();
        let email = accounts
            .iter()
            .find(|(_, account)| account.uid == principal.id.as_str())
            .map(|(email, _)| email.clone())
            .ok_or(IdentityError::NotFound)?;
        accounts.remove(&email);
        Ok(())
    }
}

/// Record store held in memory
#[derive(Debug, Default)]
pub struct InMemoryRecords {
    documents: Mutex<HashMap<RecordKey, String>>,
    calls: Mutex<Vec<RecordKey>>,
    failure: Mutex<Option<RecordStoreError>>,
}

impl InMemoryRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document
    #[must_use]
    pub fn with_record(self, collection: &str, id: &str, body: &str) -> Self {
        self.documents.lock().insert(
            RecordKey {
                collection: collection.to_string(),
                id: id.to_string(),
            },
            body.to_string(),
        );
        self
    }

    /// Fail every deletion with `error`
    pub fn fail_with(&self, error: RecordStoreError) {
        *self.failure.lock() = Some(error);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordKey> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    #[must_use]
    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.documents.lock().contains_key(&RecordKey {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecords {
    async fn delete_record(
        &self,
        key: &RecordKey,
        _principal: &Principal,
    ) -> Result<(), RecordStoreError> {
        self.calls.lock().push(key.clone());

        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        self.documents
            .lock()
            .remove(key)
            .map(|_| ())
            .ok_or(RecordStoreError::NotFound)
    }
}

pub fn credential(email: &str, password: &str) -> Credential {
    Credential::new(email, password)
}

/// Backends holding the demo account and its user record
pub fn seeded_backends() -> (Arc<InMemoryIdentity>, Arc<InMemoryRecords>) {
    let identity = InMemoryIdentity::new().with_account(DEMO_EMAIL, DEMO_PASSWORD, DEMO_UID);
    let records = InMemoryRecords::new().with_record(
        DEFAULT_RECORD_COLLECTION,
        DEMO_UID,
        r#"{"displayName":"Demo"}"#,
    );
    (Arc::new(identity), Arc::new(records))
}

/// Workflow wired to the given in-memory backends
///
/// # Panics
/// If `config` is invalid.
pub fn workflow_with(
    config: WorkflowConfig,
    identity: &Arc<InMemoryIdentity>,
    records: &Arc<InMemoryRecords>,
) -> AccountDeletionWorkflow {
    let identity: Arc<dyn IdentityService> = identity.clone();
    let records: Arc<dyn RecordStore> = records.clone();
    AccountDeletionWorkflow::new(config, identity, records).expect("valid workflow config")
}
