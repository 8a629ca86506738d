//! Identity Toolkit backend
//!
//! Password sign-in and account deletion over the v1 REST API.

use crate::config::FirebaseConfig;
use crate::error::{identity_status_error, identity_transport_error};
use erasure_core::{
    Credential, IdentityError, IdentityService, Principal, PrincipalId, SessionToken,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    id_token: &'a str,
}

/// Identity service backed by Firebase Authentication
#[derive(Debug, Clone)]
pub struct FirebaseIdentity {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FirebaseIdentity {
    /// Create with a shared HTTP client
    #[must_use]
    pub fn new(http: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: config.auth_endpoint.clone(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/v1/accounts:{}?key={}", self.endpoint, method, self.api_key)
    }

    async fn post<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(self.url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| identity_transport_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| identity_transport_error(&e))?;

        if status.is_success() {
            Ok(text)
        } else {
            let error = identity_status_error(status, &text);
            tracing::debug!("Identity Toolkit {} returned {}: {}", method, status, error);
            Err(error)
        }
    }
}

#[async_trait::async_trait]
impl IdentityService for FirebaseIdentity {
    async fn authenticate(&self, credential: &Credential) -> Result<Principal, IdentityError> {
        let body = self
            .post(
                "signInWithPassword",
                &SignInRequest {
                    email: &credential.email,
                    password: &credential.password,
                    return_secure_token: true,
                },
            )
            .await?;

        let response: SignInResponse =
            serde_json::from_str(&body).map_err(|_| IdentityError::Unknown {
                code: "malformed-response".to_string(),
            })?;

        Ok(Principal::new(
            PrincipalId::new(response.local_id),
            response.email.unwrap_or_else(|| credential.email.clone()),
            SessionToken::new(response.id_token),
        ))
    }

    async fn delete_identity(&self, principal: &Principal) -> Result<(), IdentityError> {
        self.post(
            "delete",
            &DeleteRequest {
                id_token: principal.session.expose(),
            },
        )
        .await
        .map(|_| ())
    }
}
