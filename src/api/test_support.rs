//! Router harness for handler tests.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use super::{
    app,
    handlers::auth::{AuthConfig, AuthState, SessionUser},
};
use crate::store::{
    AnalyticsEvent, AnalyticsFilter, Event, InsertOutcome, Inquiry, MemoryStore, Role,
    SharedStore, Store, User,
};

pub(crate) const TEST_SECRET: &str = "marquee-test-secret";

pub(crate) struct TestApp {
    pub router: Router,
    pub store: SharedStore,
    pub auth_state: Arc<AuthState>,
}

pub(crate) fn auth_state(config: AuthConfig) -> Result<Arc<AuthState>> {
    Ok(Arc::new(AuthState::new(
        config,
        &SecretString::from(TEST_SECRET),
    )?))
}

pub(crate) fn with_store(store: SharedStore) -> Result<TestApp> {
    let auth_state = auth_state(AuthConfig::default())?;
    Ok(TestApp {
        router: app(store.clone(), auth_state.clone()),
        store,
        auth_state,
    })
}

pub(crate) fn test_app() -> Result<TestApp> {
    with_store(Arc::new(MemoryStore::new()))
}

pub(crate) fn session_user(role: Role) -> SessionUser {
    SessionUser {
        id: Uuid::now_v7().to_string(),
        email: format!("{}@example.com", role.as_str()),
        role,
        name: Some("Test".to_string()),
    }
}

/// `Cookie` header value holding a session that expires `ttl_seconds` from now.
pub(crate) fn session_cookie(auth_state: &AuthState, role: Role, ttl_seconds: i64) -> Result<String> {
    let token = auth_state
        .codec()
        .encode(&session_user(role), Utc::now().timestamp() + ttl_seconds)?;
    Ok(format!("session={token}"))
}

pub(crate) fn admin_cookie(auth_state: &AuthState) -> Result<String> {
    session_cookie(auth_state, Role::Admin, 3600)
}

pub(crate) fn request(
    method: Method,
    uri: &str,
    body: Option<&Value>,
    cookie: Option<&str>,
) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(value)?)
        }
        None => Body::empty(),
    };
    builder.body(body).context("failed to build request")
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `Null` when the body is empty or not JSON.
    pub json: Value,
    pub text: String,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

pub(crate) async fn send(router: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok(TestResponse {
        status,
        headers,
        json,
        text,
    })
}

/// Pull the token out of a `Set-Cookie` value.
pub(crate) fn cookie_token(set_cookie: &str) -> Option<&str> {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("session="))
}

/// Store whose every call fails.
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

fn down<T>() -> Result<T> {
    Err(anyhow!("store is down"))
}

#[async_trait]
impl Store for FailingStore {
    async fn ping(&self) -> Result<()> {
        down()
    }
    async fn find_user(&self, _identifier: &str) -> Result<Option<User>> {
        down()
    }
    async fn insert_user(&self, _user: &User) -> Result<InsertOutcome> {
        down()
    }
    async fn count_users(&self, _role: Role) -> Result<u64> {
        down()
    }
    async fn list_events(&self) -> Result<Vec<Event>> {
        down()
    }
    async fn find_event(&self, _id: Uuid) -> Result<Option<Event>> {
        down()
    }
    async fn insert_event(&self, _event: &Event) -> Result<()> {
        down()
    }
    async fn replace_event(&self, _event: &Event) -> Result<bool> {
        down()
    }
    async fn delete_event(&self, _id: Uuid) -> Result<bool> {
        down()
    }
    async fn count_events(&self) -> Result<u64> {
        down()
    }
    async fn insert_inquiry(&self, _inquiry: &Inquiry) -> Result<()> {
        down()
    }
    async fn list_inquiries(&self) -> Result<Vec<Inquiry>> {
        down()
    }
    async fn count_inquiries(&self) -> Result<u64> {
        down()
    }
    async fn insert_analytics(&self, _event: &AnalyticsEvent) -> Result<()> {
        down()
    }
    async fn count_analytics(&self, _filter: &AnalyticsFilter) -> Result<u64> {
        down()
    }
    async fn recent_analytics(&self, _skip: u64, _limit: u64) -> Result<Vec<AnalyticsEvent>> {
        down()
    }
}
