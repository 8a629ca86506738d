//! Firebase project configuration
//!
//! Read from `FIREBASE_*` environment variables. Only the API key and the
//! project id are needed to talk to the REST APIs; the remaining web app
//! settings are reported when missing but do not block startup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Web API key
pub const API_KEY_VAR: &str = "FIREBASE_API_KEY";
/// Auth domain
pub const AUTH_DOMAIN_VAR: &str = "FIREBASE_AUTH_DOMAIN";
/// Project id
pub const PROJECT_ID_VAR: &str = "FIREBASE_PROJECT_ID";
/// Storage bucket
pub const STORAGE_BUCKET_VAR: &str = "FIREBASE_STORAGE_BUCKET";
/// Messaging sender id
pub const MESSAGING_SENDER_ID_VAR: &str = "FIREBASE_MESSAGING_SENDER_ID";
/// Web app id
pub const APP_ID_VAR: &str = "FIREBASE_APP_ID";
/// Analytics measurement id
pub const MEASUREMENT_ID_VAR: &str = "FIREBASE_MEASUREMENT_ID";
/// Auth emulator `host:port`
pub const AUTH_EMULATOR_VAR: &str = "FIREBASE_AUTH_EMULATOR_HOST";
/// Firestore emulator `host:port`
pub const FIRESTORE_EMULATOR_VAR: &str = "FIRESTORE_EMULATOR_HOST";

/// Every project variable, in the order they are reported
pub const PROJECT_VARS: [&str; 7] = [
    API_KEY_VAR,
    AUTH_DOMAIN_VAR,
    PROJECT_ID_VAR,
    STORAGE_BUCKET_VAR,
    MESSAGING_SENDER_ID_VAR,
    APP_ID_VAR,
    MEASUREMENT_ID_VAR,
];

/// Public Identity Toolkit endpoint
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";
/// Public Firestore endpoint
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Firebase project settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: Option<String>,
    pub project_id: String,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
    /// Identity Toolkit base URL
    pub auth_endpoint: String,
    /// Firestore base URL
    pub firestore_endpoint: String,
}

impl FirebaseConfig {
    /// Minimal configuration against the public endpoints
    #[must_use]
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            auth_domain: None,
            project_id: project_id.into(),
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            measurement_id: None,
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            firestore_endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
        }
    }

    /// With Identity Toolkit base URL
    #[must_use]
    pub fn with_auth_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.auth_endpoint = trim_endpoint(endpoint.into());
        self
    }

    /// With Firestore base URL
    #[must_use]
    pub fn with_firestore_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.firestore_endpoint = trim_endpoint(endpoint.into());
        self
    }

    /// Load from the process environment
    ///
    /// # Errors
    /// - `ConfigError::Missing` if the API key or project id is unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// - `ConfigError::Missing` if the API key or project id is unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing = missing_vars(&get);
        if !missing.is_empty() {
            tracing::warn!("Missing Firebase environment variables: {}", missing.join(", "));
        }

        let required: Vec<String> = [API_KEY_VAR, PROJECT_ID_VAR]
            .into_iter()
            .filter(|name| get(name).is_none())
            .map(str::to_string)
            .collect();
        if !required.is_empty() {
            return Err(ConfigError::Missing(required));
        }

        let mut config = Self::new(
            get(API_KEY_VAR).unwrap_or_default(),
            get(PROJECT_ID_VAR).unwrap_or_default(),
        );
        config.auth_domain = get(AUTH_DOMAIN_VAR);
        config.storage_bucket = get(STORAGE_BUCKET_VAR);
        config.messaging_sender_id = get(MESSAGING_SENDER_ID_VAR);
        config.app_id = get(APP_ID_VAR);
        config.measurement_id = get(MEASUREMENT_ID_VAR);

        if let Some(host) = get(AUTH_EMULATOR_VAR) {
            tracing::info!("Using auth emulator at {}", host);
            config = config.with_auth_endpoint(format!("http://{host}/identitytoolkit.googleapis.com"));
        }
        if let Some(host) = get(FIRESTORE_EMULATOR_VAR) {
            tracing::info!("Using Firestore emulator at {}", host);
            config = config.with_firestore_endpoint(format!("http://{host}"));
        }

        Ok(config)
    }

    /// Project variables without a value
    #[must_use]
    pub fn missing_from<F>(lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        missing_vars(&|name: &str| lookup(name).filter(|value| !value.trim().is_empty()))
    }
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("auth_domain", &self.auth_domain)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("firestore_endpoint", &self.firestore_endpoint)
            .finish_non_exhaustive()
    }
}

fn missing_vars(get: &dyn Fn(&str) -> Option<String>) -> Vec<&'static str> {
    PROJECT_VARS
        .iter()
        .copied()
        .filter(|name| get(name).is_none())
        .collect()
}

fn trim_endpoint(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}
