//! Event listings. Reads are public; writes need an admin session.

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    auth::{AuthState, principal::require_admin, types::MessageResponse},
    non_blank,
};
use crate::{
    api::error::{ApiError, json_body},
    store::{
        Coordinates, Event, EventDraft, SharedStore,
        models::{DEFAULT_THEME_COLOR, MAX_CAPACITY},
    },
};

const REQUIRED_FIELDS: &str = "Title, date and location are required";
const INVALID_DATE: &str = "Invalid event date";
const INVALID_ID: &str = "Invalid event id";
const INVALID_CAPACITY: &str = "Invalid event capacity";

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    /// RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or `YYYY-MM-DD`.
    pub date: Option<String>,
    pub doors_open_time: Option<String>,
    pub time_string: Option<String>,
    pub location: Option<String>,
    pub venue: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub image_url: Option<String>,
    pub contact_info: Option<String>,
    pub ticket_url: Option<String>,
    pub theme_color: Option<String>,
    /// 0 to 2147483647.
    pub capacity: Option<u32>,
}

impl EventRequest {
    fn into_draft(self) -> Result<EventDraft, ApiError> {
        let (Some(title), Some(date), Some(location)) = (
            non_blank(self.title),
            non_blank(self.date),
            non_blank(self.location),
        ) else {
            return Err(ApiError::validation(REQUIRED_FIELDS));
        };
        if self.capacity.is_some_and(|capacity| capacity > MAX_CAPACITY) {
            return Err(ApiError::validation(INVALID_CAPACITY));
        }

        Ok(EventDraft {
            title,
            date: parse_event_date(&date).ok_or_else(|| ApiError::validation(INVALID_DATE))?,
            location,
            subtitle: non_blank(self.subtitle),
            tagline: non_blank(self.tagline),
            description: non_blank(self.description),
            doors_open_time: non_blank(self.doors_open_time),
            time_string: non_blank(self.time_string),
            venue: non_blank(self.venue),
            coordinates: self.coordinates,
            image_url: non_blank(self.image_url),
            contact_info: non_blank(self.contact_info),
            ticket_url: non_blank(self.ticket_url),
            theme_color: non_blank(self.theme_color)
                .unwrap_or_else(|| DEFAULT_THEME_COLOR.to_string()),
            capacity: self.capacity,
        })
    }
}

/// Accept the formats the console's date pickers produce.
pub(crate) fn parse_event_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::validation(INVALID_ID))
}

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "All events, soonest first", body = [Event]),
        (status = 500, description = "Store failure")
    ),
    tag = "events"
)]
pub async fn list_events(store: Extension<SharedStore>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(store.list_events().await?))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "No admin session")
    ),
    tag = "events"
)]
pub async fn create_event(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&headers, &auth_state)?;
    let draft = json_body(payload, REQUIRED_FIELDS)?.into_draft()?;

    let event = Event::create(draft, Utc::now());
    store.insert_event(&event).await?;
    info!(event_id = %event.id, "Event created");

    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = Event),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such event")
    ),
    tag = "events"
)]
pub async fn get_event(
    store: Extension<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let id = parse_id(&id)?;
    store
        .find_event(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Event"))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event replaced", body = Event),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "No admin session"),
        (status = 404, description = "No such event")
    ),
    tag = "events"
)]
pub async fn update_event(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    Path(id): Path<String>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    require_admin(&headers, &auth_state)?;
    let id = parse_id(&id)?;
    let draft = json_body(payload, REQUIRED_FIELDS)?.into_draft()?;

    let existing = store
        .find_event(id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    let revised = existing.revise(draft, Utc::now());
    if !store.replace_event(&revised).await? {
        return Err(ApiError::NotFound("Event"));
    }
    info!(event_id = %id, "Event updated");

    Ok(Json(revised))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 401, description = "No admin session"),
        (status = 404, description = "No such event")
    ),
    tag = "events"
)]
pub async fn delete_event(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&headers, &auth_state)?;
    let id = parse_id(&id)?;
    if !store.delete_event(id).await? {
        return Err(ApiError::NotFound("Event"));
    }
    info!(event_id = %id, "Event deleted");

    Ok(Json(MessageResponse::new("Event deleted")))
}
