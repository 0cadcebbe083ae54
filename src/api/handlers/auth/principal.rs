//! Admin checks for JSON endpoints.
//!
//! Pages go through the gate middleware and get redirected; API calls get a
//! 401 instead, whatever the reason the session was refused.

use axum::http::HeaderMap;
use chrono::Utc;

use super::{codec::SessionUser, session::current_session, state::AuthState};
use crate::{api::error::ApiError, store::Role};

/// Resolve the session cookie to an admin, or fail with
/// [`ApiError::Authorization`].
pub fn require_admin(headers: &HeaderMap, auth_state: &AuthState) -> Result<SessionUser, ApiError> {
    let claims = current_session(headers, auth_state, Utc::now()).ok_or(ApiError::Authorization)?;
    if claims.user.role == Role::Admin {
        Ok(claims.user)
    } else {
        Err(ApiError::Authorization)
    }
}
