//! Append-only interaction log fed by the public site.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use super::non_blank;
use crate::{
    api::error::{ApiError, json_body},
    store::{AnalyticsEvent, AnalyticsKind, SharedStore},
};

const REQUIRED_FIELDS: &str = "Missing required fields";
const UNKNOWN_TYPE: &str = "Unknown analytics type";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    /// `page_view`, `click` or `form_submit`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub action: Option<String>,
    pub metadata: Option<Value>,
    pub user_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/analytics",
    request_body = AnalyticsRequest,
    responses(
        (status = 201, description = "Interaction recorded"),
        (status = 400, description = "Type or action missing, or unknown type"),
        (status = 500, description = "Store failure")
    ),
    tag = "analytics"
)]
pub async fn record(
    store: Extension<SharedStore>,
    payload: Result<Json<AnalyticsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload, REQUIRED_FIELDS)?;
    let (Some(kind), Some(action)) = (non_blank(request.kind), non_blank(request.action)) else {
        return Err(ApiError::validation(REQUIRED_FIELDS));
    };
    let kind = AnalyticsKind::parse(&kind).ok_or_else(|| ApiError::validation(UNKNOWN_TYPE))?;

    let event = AnalyticsEvent {
        id: Uuid::now_v7(),
        kind,
        action,
        // Only objects are kept; scalars carry nothing the dashboard reads.
        metadata: request.metadata.filter(Value::is_object),
        user_id: non_blank(request.user_id),
        created_at: Utc::now(),
    };
    store.insert_analytics(&event).await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}
