use erasure_core::{
    AccountDeletionWorkflow, Credential, IdentityError, IdentityService, Principal, PrincipalId,
    RecordKey, RecordStore, RecordStoreError, SessionToken, WorkflowConfig, WorkflowState,
};
use erasure_firebase::{FirebaseClient, FirebaseConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";
const DELETE_PATH: &str = "/v1/accounts:delete";
const DOCUMENT_PATH: &str = "/v1/projects/demo/databases/(default)/documents/users/uid-1";

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: Value,
}

impl Canned {
    fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": { "code": status.as_u16(), "message": message } }),
        }
    }
}

/// Fake Identity Toolkit and Firestore on one port
#[derive(Clone)]
struct FakeFirebase {
    sign_in: Canned,
    delete: Canned,
    document: Canned,
}

impl Default for FakeFirebase {
    fn default() -> Self {
        Self {
            sign_in: Canned::ok(json!({
                "localId": "uid-1",
                "email": "a@b.com",
                "idToken": "token-1",
                "registered": true
            })),
            delete: Canned::ok(json!({ "kind": "identitytoolkit#DeleteAccountResponse" })),
            document: Canned::ok(json!({})),
        }
    }
}

struct Running {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Running {
    fn client(&self) -> FirebaseClient {
        let base = format!("http://{}", self.addr);
        let config = FirebaseConfig::new("test-key", "demo")
            .with_auth_endpoint(base.clone())
            .with_firestore_endpoint(base);
        FirebaseClient::connect(config).unwrap()
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.seen().into_iter().map(|s| s.path).collect()
    }
}

fn serve(fake: FakeFirebase) -> Running {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    let routes = warp::method()
        .and(warp::path::full())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::bytes())
        .map(
            move |method: Method, path: FullPath, authorization: Option<String>, body: Bytes| {
                let canned = match path.as_str() {
                    SIGN_IN_PATH => fake.sign_in.clone(),
                    DELETE_PATH => fake.delete.clone(),
                    DOCUMENT_PATH => fake.document.clone(),
                    _ => Canned::error(StatusCode::NOT_FOUND, "NO_ROUTE"),
                };
                log.lock().unwrap().push(Seen {
                    method,
                    path: path.as_str().to_string(),
                    authorization,
                    body: serde_json::from_slice(&body).unwrap_or(Value::Null),
                });
                warp::reply::with_status(warp::reply::json(&canned.body), canned.status)
            },
        );

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    Running { addr, seen }
}

fn principal() -> Principal {
    Principal::new(
        PrincipalId::new("uid-1"),
        "a@b.com",
        SessionToken::new("token-1"),
    )
}

#[tokio::test]
async fn test_sign_in_returns_principal() {
    let server = serve(FakeFirebase::default());
    let identity = server.client().identity();

    let principal = identity
        .authenticate(&Credential::new("a@b.com", "secret"))
        .await
        .unwrap();

    assert_eq!(principal.id, PrincipalId::new("uid-1"));
    assert_eq!(principal.session.expose(), "token-1");

    let seen = server.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(
        seen[0].body,
        json!({ "email": "a@b.com", "password": "secret", "returnSecureToken": true })
    );
}

#[tokio::test]
async fn test_sign_in_error_codes_map() {
    let cases = [
        ("EMAIL_NOT_FOUND", IdentityError::NotFound),
        ("INVALID_PASSWORD", IdentityError::Unauthorized),
        ("INVALID_EMAIL", IdentityError::InvalidInput),
        (
            "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled",
            IdentityError::Throttled,
        ),
    ];

    for (message, expected) in cases {
        let server = serve(FakeFirebase {
            sign_in: Canned::error(StatusCode::BAD_REQUEST, message),
            ..FakeFirebase::default()
        });
        let result = server
            .client()
            .identity()
            .authenticate(&Credential::new("a@b.com", "secret"))
            .await;
        assert_eq!(result.unwrap_err(), expected, "message: {message}");
    }
}

#[tokio::test]
async fn test_malformed_sign_in_body_is_unknown() {
    let server = serve(FakeFirebase {
        sign_in: Canned::ok(json!({ "unexpected": true })),
        ..FakeFirebase::default()
    });

    let err = server
        .client()
        .identity()
        .authenticate(&Credential::new("a@b.com", "secret"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        IdentityError::Unknown {
            code: "malformed-response".to_string()
        }
    );
}

#[tokio::test]
async fn test_delete_identity_sends_token() {
    let server = serve(FakeFirebase::default());

    server
        .client()
        .identity()
        .delete_identity(&principal())
        .await
        .unwrap();

    let seen = server.seen();
    assert_eq!(seen[0].path, DELETE_PATH);
    assert_eq!(seen[0].body, json!({ "idToken": "token-1" }));
}

#[tokio::test]
async fn test_stale_session_requires_reauth() {
    let server = serve(FakeFirebase {
        delete: Canned::error(StatusCode::BAD_REQUEST, "CREDENTIAL_TOO_OLD_LOGIN_AGAIN"),
        ..FakeFirebase::default()
    });

    let err = server
        .client()
        .identity()
        .delete_identity(&principal())
        .await
        .unwrap_err();

    assert_eq!(err, IdentityError::ReauthRequired);
}

#[tokio::test]
async fn test_document_delete_uses_bearer_token() {
    let server = serve(FakeFirebase::default());
    let key = RecordKey::for_principal("users", &principal());

    server
        .client()
        .records()
        .delete_record(&key, &principal())
        .await
        .unwrap();

    let seen = server.seen();
    assert_eq!(seen[0].method, Method::DELETE);
    assert_eq!(seen[0].path, DOCUMENT_PATH);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer token-1"));
}

#[tokio::test]
async fn test_document_statuses_map() {
    let cases = [
        (StatusCode::NOT_FOUND, RecordStoreError::NotFound),
        (StatusCode::FORBIDDEN, RecordStoreError::PermissionDenied),
    ];

    for (status, expected) in cases {
        let server = serve(FakeFirebase {
            document: Canned::error(status, "denied"),
            ..FakeFirebase::default()
        });
        let key = RecordKey::for_principal("users", &principal());
        let err = server
            .client()
            .records()
            .delete_record(&key, &principal())
            .await
            .unwrap_err();
        assert_eq!(err, expected);
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let config = FirebaseConfig::new("test-key", "demo")
        .with_auth_endpoint("http://127.0.0.1:1")
        .with_firestore_endpoint("http://127.0.0.1:1");
    let client = FirebaseClient::connect(config).unwrap();

    let err = client
        .identity()
        .authenticate(&Credential::new("a@b.com", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Network(_)));

    let key = RecordKey::for_principal("users", &principal());
    let err = client
        .records()
        .delete_record(&key, &principal())
        .await
        .unwrap_err();
    assert!(matches!(err, RecordStoreError::Network(_)));
}

#[tokio::test]
async fn test_workflow_against_fake_backend() {
    let server = serve(FakeFirebase::default());
    let client = server.client();
    let workflow =
        AccountDeletionWorkflow::new(WorkflowConfig::new(), client.identity(), client.records())
            .unwrap();

    workflow.submit(Credential::new("a@b.com", "secret")).unwrap();
    let state = workflow.confirm().await.unwrap();

    assert_eq!(state, WorkflowState::Succeeded);
    assert_eq!(server.paths(), vec![SIGN_IN_PATH, DOCUMENT_PATH, DELETE_PATH]);
}

#[tokio::test]
async fn test_workflow_survives_missing_document() {
    let server = serve(FakeFirebase {
        document: Canned::error(StatusCode::NOT_FOUND, "NOT_FOUND"),
        ..FakeFirebase::default()
    });
    let client = server.client();
    let workflow =
        AccountDeletionWorkflow::new(WorkflowConfig::new(), client.identity(), client.records())
            .unwrap();

    workflow.submit(Credential::new("a@b.com", "secret")).unwrap();

    assert_eq!(workflow.confirm().await.unwrap(), WorkflowState::Succeeded);
    assert_eq!(server.paths().last().map(String::as_str), Some(DELETE_PATH));
}
