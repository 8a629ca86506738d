//! Firestore record store

use crate::config::FirebaseConfig;
use crate::error::record_status_error;
use erasure_core::{Principal, RecordKey, RecordStore, RecordStoreError};

/// Record store backed by Cloud Firestore
///
/// Requests carry the principal's session token, so security rules are
/// evaluated against the account being deleted.
#[derive(Debug, Clone)]
pub struct FirestoreRecords {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
}

impl FirestoreRecords {
    /// Create with a shared HTTP client
    #[must_use]
    pub fn new(http: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            http,
            endpoint: config.firestore_endpoint.clone(),
            project_id: config.project_id.clone(),
        }
    }

    /// Document URL for a record key
    #[must_use]
    pub fn document_url(&self, key: &RecordKey) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.endpoint, self.project_id, key.collection, key.id
        )
    }
}

#[async_trait::async_trait]
impl RecordStore for FirestoreRecords {
    async fn delete_record(
        &self,
        key: &RecordKey,
        principal: &Principal,
    ) -> Result<(), RecordStoreError> {
        let response = self
            .http
            .delete(self.document_url(key))
            .bearer_auth(principal.session.expose())
            .send()
            .await
            .map_err(|e| RecordStoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(record_status_error(status, &body))
    }
}
