//! Shared client for both Firebase backends

use crate::config::FirebaseConfig;
use crate::error::ConfigError;
use crate::identity::FirebaseIdentity;
use crate::records::FirestoreRecords;
use erasure_core::{IdentityService, RecordStore};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One HTTP connection pool serving identity and record requests
#[derive(Debug, Clone)]
pub struct FirebaseClient {
    config: FirebaseConfig,
    http: reqwest::Client,
}

impl FirebaseClient {
    /// Build the HTTP client for a project
    ///
    /// # Errors
    /// - `ConfigError::Client` if the TLS backend cannot be initialised
    pub fn connect(config: FirebaseConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("erasure/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!("Firebase client ready for project: {}", config.project_id);
        Ok(Self { config, http })
    }

    /// Project configuration
    #[must_use]
    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    /// Identity backend
    #[must_use]
    pub fn identity(&self) -> Arc<dyn IdentityService> {
        Arc::new(FirebaseIdentity::new(self.http.clone(), &self.config))
    }

    /// Record backend
    #[must_use]
    pub fn records(&self) -> Arc<dyn RecordStore> {
        Arc::new(FirestoreRecords::new(self.http.clone(), &self.config))
    }
}
