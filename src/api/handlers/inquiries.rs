//! Inquiries submitted through the public contact form.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    auth::{AuthState, principal::require_admin},
    non_blank,
};
use crate::{
    api::error::{ApiError, json_body},
    store::{Inquiry, SharedStore},
};

const REQUIRED_FIELDS: &str = "All fields are required";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct InquiryCreated {
    pub message: String,
    pub inquiry: Inquiry,
}

#[utoipa::path(
    post,
    path = "/api/inquire",
    request_body = InquiryRequest,
    responses(
        (status = 201, description = "Inquiry stored", body = InquiryCreated),
        (status = 400, description = "A field is missing")
    ),
    tag = "inquiries"
)]
pub async fn inquire(
    store: Extension<SharedStore>,
    payload: Result<Json<InquiryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload, REQUIRED_FIELDS)?;
    let (Some(first_name), Some(last_name), Some(email), Some(message)) = (
        non_blank(request.first_name),
        non_blank(request.last_name),
        non_blank(request.email),
        non_blank(request.message),
    ) else {
        return Err(ApiError::validation(REQUIRED_FIELDS));
    };

    let inquiry = Inquiry {
        id: Uuid::now_v7(),
        first_name,
        last_name,
        email: email.to_lowercase(),
        message,
        created_at: Utc::now(),
    };
    store.insert_inquiry(&inquiry).await?;
    info!(inquiry_id = %inquiry.id, "Inquiry received");

    Ok((
        StatusCode::CREATED,
        Json(InquiryCreated {
            message: "Inquiry received successfully".to_string(),
            inquiry,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/inquiries",
    responses(
        (status = 200, description = "All inquiries, newest first", body = [Inquiry]),
        (status = 401, description = "No admin session")
    ),
    tag = "inquiries"
)]
pub async fn list_inquiries(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<Inquiry>>, ApiError> {
    require_admin(&headers, &auth_state)?;
    Ok(Json(store.list_inquiries().await?))
}
