//! Dashboard statistics.
//!
//! Counters come from independent store queries run concurrently; there is no
//! snapshot across them, so a write landing mid-request can make two numbers
//! disagree by one. Any failing query fails the whole response.

use axum::{
    Json,
    extract::{Extension, Query},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::auth::{AuthState, principal::require_admin};
use crate::{
    api::error::ApiError,
    store::{AnalyticsEvent, AnalyticsFilter, Event, Role, SharedStore, Store},
};

pub const DEFAULT_CAPACITY: u32 = 2000;
const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

/// Raw query values; anything unparsable falls back to the default.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// 1-based page of recent interactions (default 1).
    pub page: Option<String>,
    /// Page size, 1 to 100 (default 10).
    pub limit: Option<String>,
}

impl StatsQuery {
    fn page(&self) -> u64 {
        parse_positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE)
    }

    fn limit(&self) -> u64 {
        parse_positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }
}

fn parse_positive(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

#[derive(ToSchema, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// `capacity` is always present here; unset or 0 reads as 2000.
    #[serde(flatten)]
    pub event: Event,
    pub tickets_sold: u64,
}

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl Pagination {
    fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }

    fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(ToSchema, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Contacts captured from the public site.
    pub users: u64,
    pub admins: u64,
    pub events: u64,
    pub inquiries: u64,
    pub tickets_sold: u64,
    pub total_visits: u64,
    pub events_data: Vec<EventStats>,
    pub recent_interactions: Vec<AnalyticsEvent>,
    pub pagination: Pagination,
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "No admin session"),
        (status = 500, description = "Store failure")
    ),
    tag = "admin"
)]
pub async fn stats(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DashboardStats>, ApiError> {
    require_admin(&headers, &auth_state)?;
    Ok(Json(aggregate(&**store, query.page(), query.limit()).await?))
}

/// Build the dashboard for one page of recent interactions.
///
/// # Errors
/// Returns the first store error encountered.
pub async fn aggregate(store: &dyn Store, page: u64, limit: u64) -> anyhow::Result<DashboardStats> {
    let waitlist = AnalyticsFilter::ticket_waitlist();
    let page_views = AnalyticsFilter::page_views();
    let everything = AnalyticsFilter::all();
    let (users, admins, events, inquiries, tickets_sold, total_visits, total_interactions) = tokio::try_join!(
        store.count_users(Role::User),
        store.count_users(Role::Admin),
        store.count_events(),
        store.count_inquiries(),
        store.count_analytics(&waitlist),
        store.count_analytics(&page_views),
        store.count_analytics(&everything),
    )?;

    let pagination = Pagination::new(total_interactions, page, limit);
    let recent_interactions = store
        .recent_analytics(pagination.skip(), pagination.limit)
        .await?;

    let mut events_data = Vec::new();
    for mut event in store.list_events().await? {
        let sold = store
            .count_analytics(&AnalyticsFilter::ticket_waitlist().for_event(&event.title))
            .await?;
        event.capacity = Some(effective_capacity(event.capacity));
        events_data.push(EventStats {
            event,
            tickets_sold: sold,
        });
    }

    Ok(DashboardStats {
        users,
        admins,
        events,
        inquiries,
        tickets_sold,
        total_visits,
        events_data,
        recent_interactions,
        pagination,
    })
}

/// A missing or zero capacity reads as the default house size.
fn effective_capacity(capacity: Option<u32>) -> u32 {
    capacity
        .filter(|capacity| *capacity > 0)
        .unwrap_or(DEFAULT_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> StatsQuery {
        StatsQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn query_defaults_and_clamps() {
        let defaults = query(None, None);
        assert_eq!((defaults.page(), defaults.limit()), (1, 10));

        let junk = query(Some("abc"), Some("-5"));
        assert_eq!((junk.page(), junk.limit()), (1, 10));

        let zero = query(Some("0"), Some("0"));
        assert_eq!((zero.page(), zero.limit()), (1, 10));

        let large = query(Some("7"), Some("1000"));
        assert_eq!((large.page(), large.limit()), (7, MAX_LIMIT));
    }

    #[test]
    fn zero_or_missing_capacity_uses_default() {
        assert_eq!(effective_capacity(None), DEFAULT_CAPACITY);
        assert_eq!(effective_capacity(Some(0)), DEFAULT_CAPACITY);
        assert_eq!(effective_capacity(Some(1)), 1);
        assert_eq!(effective_capacity(Some(150)), 150);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(0, 1, 10).total_pages, 0);
        assert_eq!(Pagination::new(10, 1, 10).total_pages, 1);
        assert_eq!(Pagination::new(25, 1, 10).total_pages, 3);
        assert_eq!(Pagination::new(25, 3, 10).skip(), 20);
    }
}
