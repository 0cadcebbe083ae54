//! Contact capture from the public site's sign-up modal.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::non_blank;
use crate::{
    api::error::{ApiError, json_body},
    store::{InsertOutcome, Role, SharedStore, User},
};

const REQUIRED_FIELD: &str = "Email or phone number is required";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub email_or_phone: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ContactResponse {
    pub message: String,
    pub user: User,
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Contact recorded", body = ContactResponse),
        (status = 200, description = "Contact was already recorded", body = ContactResponse),
        (status = 400, description = "Identifier missing")
    ),
    tag = "contact"
)]
pub async fn contact(
    store: Extension<SharedStore>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let identifier = non_blank(json_body(payload, REQUIRED_FIELD)?.email_or_phone)
        .ok_or_else(|| ApiError::validation(REQUIRED_FIELD))?;

    if let Some(user) = store.find_user(&identifier).await? {
        return Ok(already_recorded(user));
    }

    let user = User::new(identifier, Role::User, Utc::now());
    match store.insert_user(&user).await? {
        InsertOutcome::Created => {
            info!(user_id = %user.id, "Contact recorded");
            Ok((
                StatusCode::CREATED,
                Json(ContactResponse {
                    message: "Contact info saved successfully".to_string(),
                    user,
                }),
            ))
        }
        // A concurrent request inserted the same identifier first.
        InsertOutcome::Conflict => {
            let existing = store
                .find_user(&user.identifier)
                .await?
                .ok_or_else(|| anyhow::anyhow!("contact vanished after conflicting insert"))?;
            Ok(already_recorded(existing))
        }
    }
}

fn already_recorded(user: User) -> (StatusCode, Json<ContactResponse>) {
    (
        StatusCode::OK,
        Json(ContactResponse {
            message: "User info already recorded".to_string(),
            user,
        }),
    )
}
