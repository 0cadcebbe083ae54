//! Records persisted by the store and the filters used to count them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Analytics action recorded when a visitor joins a ticket waitlist.
pub const TICKET_WAITLIST_ACTION: &str = "ticket_waitlist";

/// Metadata key that names the event a waitlist submission refers to.
pub const METADATA_EVENT_KEY: &str = "event";

pub const DEFAULT_THEME_COLOR: &str = "red";

/// Largest capacity the `INTEGER` column can hold.
pub const MAX_CAPACITY: u32 = i32::MAX.unsigned_abs();

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A contact captured from the public site or a seeded administrator.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "emailOrPhone")]
    pub identifier: String,
    /// Argon2 PHC string. Absent for contact-only users.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(identifier: String, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            identifier,
            password_hash: None,
            role,
            name: None,
            created_at: now,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Past,
}

impl EventStatus {
    /// Status of an event dated `date` as seen at `now`.
    #[must_use]
    pub fn at(date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if date < now { Self::Past } else { Self::Upcoming }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Past => "past",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upcoming" => Some(Self::Upcoming),
            "past" => Some(Self::Past),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Validated event fields as submitted by the admin console.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub subtitle: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub doors_open_time: Option<String>,
    pub time_string: Option<String>,
    pub location: String,
    pub venue: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub image_url: Option<String>,
    pub contact_info: Option<String>,
    pub ticket_url: Option<String>,
    pub theme_color: String,
    pub capacity: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors_open_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_string: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    pub theme_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Computed from `date` when the event is written, never on read.
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Build a new event record, stamping its status at `now`.
    #[must_use]
    pub fn create(draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self::from_draft(Uuid::now_v7(), draft, now, now)
    }

    /// Replace every editable field, keeping identity and creation time.
    #[must_use]
    pub fn revise(&self, draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self::from_draft(self.id, draft, self.created_at, now)
    }

    fn from_draft(
        id: Uuid,
        draft: EventDraft,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status: EventStatus::at(draft.date, now),
            title: draft.title,
            subtitle: draft.subtitle,
            tagline: draft.tagline,
            description: draft.description,
            date: draft.date,
            doors_open_time: draft.doors_open_time,
            time_string: draft.time_string,
            location: draft.location,
            venue: draft.venue,
            coordinates: draft.coordinates,
            image_url: draft.image_url,
            contact_info: draft.contact_info,
            ticket_url: draft.ticket_url,
            theme_color: draft.theme_color,
            capacity: draft.capacity,
            created_at,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsKind {
    PageView,
    Click,
    FormSubmit,
}

impl AnalyticsKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::Click => "click",
            Self::FormSubmit => "form_submit",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "page_view" => Some(Self::PageView),
            "click" => Some(Self::Click),
            "form_submit" => Some(Self::FormSubmit),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AnalyticsKind,
    /// Path for page views, identifier for clicks and forms.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Conjunctive filter over analytics events; `None` fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalyticsFilter {
    pub kind: Option<AnalyticsKind>,
    pub action: Option<String>,
    /// Exact, case-sensitive match on `metadata.event`.
    pub event_title: Option<String>,
}

impl AnalyticsFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page_views() -> Self {
        Self {
            kind: Some(AnalyticsKind::PageView),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ticket_waitlist() -> Self {
        Self {
            kind: Some(AnalyticsKind::FormSubmit),
            action: Some(TICKET_WAITLIST_ACTION.to_string()),
            event_title: None,
        }
    }

    #[must_use]
    pub fn for_event(mut self, title: &str) -> Self {
        self.event_title = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn matches(&self, event: &AnalyticsEvent) -> bool {
        if self.kind.is_some_and(|kind| kind != event.kind) {
            return false;
        }
        if self
            .action
            .as_deref()
            .is_some_and(|action| action != event.action)
        {
            return false;
        }
        match self.event_title.as_deref() {
            None => true,
            Some(title) => event
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.get(METADATA_EVENT_KEY))
                .and_then(Value::as_str)
                .is_some_and(|value| value == title),
        }
    }
}
