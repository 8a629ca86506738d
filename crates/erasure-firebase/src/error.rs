//! Error types for the Firebase backends

use erasure_core::{IdentityError, RecordStoreError};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required variables unset
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// HTTP client could not be built
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Error body returned by the Identity Toolkit and Firestore
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

/// Map a transport failure to the identity taxonomy
pub(crate) fn identity_transport_error(error: &reqwest::Error) -> IdentityError {
    if error.is_decode() {
        IdentityError::Unknown {
            code: "malformed-response".to_string(),
        }
    } else {
        IdentityError::Network(error.to_string())
    }
}

/// Map a non-success Identity Toolkit response
pub(crate) fn identity_status_error(status: reqwest::StatusCode, body: &str) -> IdentityError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            IdentityError::from_code(&envelope.error.message)
        }
        _ if status.is_server_error() => IdentityError::Network(format!("server returned {status}")),
        _ => IdentityError::Unknown {
            code: format!("http-{}", status.as_u16()),
        },
    }
}

/// Map a non-success Firestore response
pub(crate) fn record_status_error(status: reqwest::StatusCode, body: &str) -> RecordStoreError {
    match status.as_u16() {
        404 => RecordStoreError::NotFound,
        401 | 403 => RecordStoreError::PermissionDenied,
        _ => {
            let detail = serde_json::from_str::<ErrorEnvelope>(body)
                .ok()
                .map(|envelope| {
                    envelope
                        .error
                        .status
                        .unwrap_or(envelope.error.message)
                })
                .unwrap_or_else(|| format!("http {status}"));
            RecordStoreError::Backend(detail)
        }
    }
}
