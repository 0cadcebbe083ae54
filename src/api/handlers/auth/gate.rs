//! Middleware guarding the admin console pages.

use axum::{
    extract::{Extension, Request},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

use super::{
    session::{extract_session_token, issue_session_cookie},
    state::AuthState,
};
use crate::store::Role;

pub const LOGIN_PAGE: &str = "/admin/login";

/// Serve admin pages only to a valid admin session and slide its expiry.
///
/// The login page passes through untouched. A rejected cookie is left in
/// place; the redirect alone sends the browser back to the login form.
pub async fn admin_gate(
    Extension(auth_state): Extension<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == LOGIN_PAGE {
        return next.run(request).await;
    }

    let Some(token) = extract_session_token(request.headers()) else {
        debug!("No session cookie, redirecting to login");
        return Redirect::to(LOGIN_PAGE).into_response();
    };

    let now = Utc::now();
    let claims = match auth_state.codec().decode(&token, now.timestamp()) {
        Ok(claims) => claims,
        Err(err) => {
            debug!(reason = %err, "Session cookie rejected, redirecting to login");
            return Redirect::to(LOGIN_PAGE).into_response();
        }
    };

    if claims.user.role != Role::Admin {
        debug!("Session is not an admin session, redirecting to login");
        return Redirect::to(LOGIN_PAGE).into_response();
    }

    let mut response = next.run(request).await;

    match issue_session_cookie(
        &auth_state,
        &claims.user,
        now,
        auth_state.config().session_ttl_seconds(),
    ) {
        Ok(cookie) => {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to refresh session cookie: {err:#}"),
    }

    response
}
