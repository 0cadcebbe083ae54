//! Session cookie handling plus the logout and session probe endpoints.

use anyhow::{Context, Result};
use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error};

use super::{
    codec::{SessionClaims, SessionUser},
    state::{AuthConfig, AuthState},
};
use crate::store::Role;

pub const SESSION_COOKIE_NAME: &str = "session";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[utoipa::path(
    get,
    path = "/api/admin/session",
    responses(
        (status = 200, description = "Admin session is active", body = SessionUser),
        (status = 204, description = "No active admin session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    // Any failure reads as "signed out" so the probe never reveals why.
    match current_session(&headers, &auth_state, Utc::now()) {
        Some(claims) if claims.user.role == Role::Admin => {
            (StatusCode::OK, Json(claims.user)).into_response()
        }
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build logout cookie: {err}"),
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Decode the session cookie, if any, as seen at `now`.
pub(crate) fn current_session(
    headers: &HeaderMap,
    auth_state: &AuthState,
    now: DateTime<Utc>,
) -> Option<SessionClaims> {
    let token = extract_session_token(headers)?;
    match auth_state.codec().decode(&token, now.timestamp()) {
        Ok(claims) => Some(claims),
        Err(err) => {
            debug!("Rejected session cookie: {err}");
            None
        }
    }
}

/// Sign a session for `user` and wrap it in a `Set-Cookie` value expiring at
/// `now + ttl_seconds`.
pub(crate) fn issue_session_cookie(
    auth_state: &AuthState,
    user: &SessionUser,
    now: DateTime<Utc>,
    ttl_seconds: i64,
) -> Result<HeaderValue> {
    let expires_at = now.timestamp().saturating_add(ttl_seconds);
    let token = auth_state
        .codec()
        .encode(user, expires_at)
        .context("failed to sign session")?;
    session_cookie(auth_state.config(), &token, now, ttl_seconds)
        .context("failed to build session cookie")
}

/// `HttpOnly` cookie whose `Expires` and `Max-Age` both land on the claim expiry.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
    now: DateTime<Utc>,
    ttl_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let expires = DateTime::<Utc>::from_timestamp(now.timestamp().saturating_add(ttl_seconds), 0)
        .unwrap_or(now)
        .format(HTTP_DATE_FORMAT);
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Expires={expires}; Max-Age={ttl_seconds}"
    );
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0"
    );
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                let val = val.trim();
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(COOKIE, value);
        }
        headers
    }

    #[test]
    fn extract_finds_session_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=abc.def.ghi; lang=en");
        assert_eq!(
            extract_session_token(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn extract_ignores_empty_or_missing_cookie() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
        assert!(extract_session_token(&headers_with_cookie("session=")).is_none());
        assert!(extract_session_token(&headers_with_cookie("sessionx=1")).is_none());
    }

    #[test]
    fn cookie_carries_security_attributes() -> Result<()> {
        let now = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .context("valid timestamp")?;
        let config = AuthConfig::default();
        let cookie = session_cookie(&config, "tok", now, 3600)?;
        let cookie = cookie.to_str()?;
        assert!(cookie.starts_with("session=tok; Path=/; HttpOnly; SameSite=Lax"));
        assert!(cookie.contains("Expires=Wed, 01 Jan 2025 01:00:00 GMT"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie(&config.with_secure_cookies(true), "tok", now, 60)?;
        assert!(secure.to_str()?.ends_with("; Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> Result<()> {
        let cookie = clear_session_cookie(&AuthConfig::default())?;
        let cookie = cookie.to_str()?;
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
        Ok(())
    }
}
