use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use health_journal::{
    build_router,
    crypto::token::TokenSigner,
    error::{AppError, Result},
    models::user::{NewUser, User},
    repositories::user::{MemoryUserStore, UserStore},
    services::auth as auth_service,
    state::AppState,
};

const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

// Shared test context
struct TestContext {
    app: Router,
    store: MemoryUserStore,
    tokens: TokenSigner,
}

impl TestContext {
    async fn new() -> Self {
        let store = MemoryUserStore::new();
        auth_service::create_user(&store, "a@b.com".to_string(), "secret", "A".to_string())
            .await
            .unwrap();

        let tokens = TokenSigner::new(SECRET, Duration::hours(24));
        let state = AppState::with_store(Arc::new(store.clone()), tokens.clone());

        Self {
            app: build_router(state),
            store,
            tokens,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn signin(&self, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post("/auth/signin")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn validate(&self, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::get("/auth/validate");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }
}

#[tokio::test]
async fn test_signin_returns_user_and_token() {
    let context = TestContext::new().await;

    let (status, body) = context
        .signin(json!({ "email": "a@b.com", "password": "secret" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["name"], "A");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let context = TestContext::new().await;

    let wrong = context
        .signin(json!({ "email": "a@b.com", "password": "nope" }))
        .await;
    let unknown = context
        .signin(json!({ "email": "nobody@b.com", "password": "secret" }))
        .await;

    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.1, json!({ "message": "Invalid credentials" }));
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn test_signin_requires_both_fields() {
    let context = TestContext::new().await;

    for body in [
        json!({ "email": "a@b.com" }),
        json!({ "password": "secret" }),
        json!({ "email": "", "password": "secret" }),
        json!({}),
    ] {
        let (status, body) = context.signin(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email and password are required");
    }
}

#[tokio::test]
async fn test_signin_with_unreadable_body_is_bad_request() {
    let context = TestContext::new().await;

    let (status, _) = context
        .send(
            Request::post("/auth/signin")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_from_signin_validates_to_same_user() {
    let context = TestContext::new().await;

    let (_, signin) = context
        .signin(json!({ "email": "a@b.com", "password": "secret" }))
        .await;
    let token = signin["token"].as_str().unwrap();

    let (status, body) = context.validate(Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], signin["user"]["_id"]);
    assert_eq!(body["email"], "a@b.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_validate_without_header() {
    let context = TestContext::new().await;

    let (status, body) = context.validate(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "No token provided" }));
}

#[tokio::test]
async fn test_validate_with_malformed_header() {
    let context = TestContext::new().await;

    let (status, body) = context.validate(Some("Token abc")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn test_validate_rejects_bad_tokens() {
    let context = TestContext::new().await;
    let user = context
        .store
        .find_by_email("a@b.com")
        .await
        .unwrap()
        .unwrap()
        .id;

    let expired = context
        .tokens
        .issue_at(user, "a@b.com", chrono::Utc::now() - Duration::hours(48))
        .unwrap();
    let foreign = TokenSigner::new(b"ffffffffffffffffffffffffffffffff", Duration::hours(24))
        .issue(user, "a@b.com")
        .unwrap();

    for token in [expired.as_str(), foreign.as_str(), "valid-token-for-deepak"] {
        let (status, body) = context.validate(Some(&format!("Bearer {}", token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }
}

#[tokio::test]
async fn test_validate_for_deleted_user() {
    let context = TestContext::new().await;
    let token = context.tokens.issue(uuid::Uuid::new_v4(), "ghost@b.com").unwrap();

    let (status, body) = context.validate(Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_wrong_methods_are_405() {
    let context = TestContext::new().await;

    for (method, uri) in [
        (Method::GET, "/auth/signin"),
        (Method::PUT, "/auth/signin"),
        (Method::POST, "/auth/validate"),
        (Method::DELETE, "/auth/validate"),
    ] {
        let (status, body) = context
            .send(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        assert_eq!(body["message"], "Method not allowed");
    }
}

// A store whose backend is down.
struct FailingStore;

#[async_trait::async_trait]
impl UserStore for FailingStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    async fn find_by_id(&self, _user_id: &uuid::Uuid) -> Result<Option<User>> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    async fn insert(&self, _user: NewUser) -> Result<User> {
        Err(AppError::Internal("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_is_a_generic_500() {
    let tokens = TokenSigner::new(SECRET, Duration::hours(24));
    let token = tokens.issue(uuid::Uuid::new_v4(), "a@b.com").unwrap();
    let context = TestContext {
        app: build_router(AppState::with_store(Arc::new(FailingStore), tokens.clone())),
        store: MemoryUserStore::new(),
        tokens,
    };

    let (status, body) = context
        .signin(json!({ "email": "a@b.com", "password": "secret" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));

    let (status, body) = context.validate(Some(&format!("Bearer {}", token))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));
}
