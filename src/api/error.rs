//! Error type shared by the JSON handlers.
//!
//! Credential failures and authorization failures both answer 401 but with
//! different messages; validation and lookup failures use an `error` key the
//! public site already reads.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub(crate) const UNAUTHORIZED: &str = "Unauthorized";
pub(crate) const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    Authentication,
    #[error("unauthorized")]
    Authorization,
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Authentication | Self::Authorization => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Authentication => json!({ "message": INVALID_CREDENTIALS }),
            Self::Authorization => json!({ "message": UNAUTHORIZED }),
            Self::Validation(message) => json!({ "error": message }),
            Self::NotFound(_) => json!({ "error": self.to_string() }),
            Self::Store(err) => {
                error!("Request failed: {err:#}");
                json!({ "message": INTERNAL_SERVER_ERROR })
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, turning any extractor rejection into a 400 carrying
/// `message`.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    message: &str,
) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            tracing::debug!("Rejected JSON body: {rejection}");
            ApiError::validation(message)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: ApiError) -> Result<(StatusCode, Value)> {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn credential_and_role_failures_share_status_not_message() -> Result<()> {
        let (status, body) = body_of(ApiError::Authentication).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], INVALID_CREDENTIALS);

        let (status, body) = body_of(ApiError::Authorization).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn not_found_names_the_record() -> Result<()> {
        let (status, body) = body_of(ApiError::NotFound("Event")).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Event not found");
        Ok(())
    }

    #[tokio::test]
    async fn store_errors_do_not_leak_details() -> Result<()> {
        let (status, body) = body_of(ApiError::Store(anyhow!("relation missing"))).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "message": INTERNAL_SERVER_ERROR }));
        Ok(())
    }
}
