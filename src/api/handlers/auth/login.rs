//! Admin login.
//!
//! Unknown accounts, accounts without a password and wrong passwords all
//! answer with the same 401 body. A correct password on a non-admin account
//! gets a distinct "Unauthorized" so the console can tell the two apart.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    codec::SessionUser,
    password::verify_password_blocking,
    session::issue_session_cookie,
    state::{AuthState, LOGIN_SESSION_TTL_SECONDS},
    types::{LoginRequest, MessageResponse},
};
use crate::{
    api::error::{ApiError, json_body},
    store::{Role, SharedStore},
};

const MISSING_FIELDS: &str = "Email and password are required";

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = MessageResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials or not an administrator"),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
pub async fn login(
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(payload, MISSING_FIELDS)?;

    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::validation(MISSING_FIELDS));
    }

    let Some(user) = store.find_user(email).await? else {
        // Same Argon2 cost as a wrong password.
        let _ = verify_password_blocking(password, None).await;
        debug!("Login for unknown identifier");
        return Err(ApiError::Authentication);
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await {
        debug!("Login with bad or missing password");
        return Err(ApiError::Authentication);
    }

    if user.role != Role::Admin {
        debug!("Login by non-admin account");
        return Err(ApiError::Authorization);
    }

    let cookie = issue_session_cookie(
        &auth_state,
        &SessionUser::from(&user),
        Utc::now(),
        LOGIN_SESSION_TTL_SECONDS,
    )?;

    info!(user_id = %user.id, "Admin signed in");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(MessageResponse::new("Login successful")),
    )
        .into_response())
}
