//! Persistence boundary for users, events, inquiries and analytics.
//!
//! Handlers only see [`Store`]. The three collections are queried
//! independently; nothing here spans a transaction across them.

pub mod memory;
pub mod models;
pub mod postgres;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use models::{
    AnalyticsEvent, AnalyticsFilter, AnalyticsKind, Coordinates, Event, EventDraft, EventStatus,
    Inquiry, Role, User,
};
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn Store>;

/// Outcome when inserting a record keyed by a unique value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Cheap round trip used by `/health`.
    async fn ping(&self) -> Result<()>;

    async fn find_user(&self, identifier: &str) -> Result<Option<User>>;
    async fn insert_user(&self, user: &User) -> Result<InsertOutcome>;
    async fn count_users(&self, role: Role) -> Result<u64>;

    /// All events, date ascending.
    async fn list_events(&self) -> Result<Vec<Event>>;
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>>;
    async fn insert_event(&self, event: &Event) -> Result<()>;
    /// Returns `false` when no event has that id.
    async fn replace_event(&self, event: &Event) -> Result<bool>;
    /// Returns `false` when no event has that id.
    async fn delete_event(&self, id: Uuid) -> Result<bool>;
    async fn count_events(&self) -> Result<u64>;

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<()>;
    /// All inquiries, newest first.
    async fn list_inquiries(&self) -> Result<Vec<Inquiry>>;
    async fn count_inquiries(&self) -> Result<u64>;

    async fn insert_analytics(&self, event: &AnalyticsEvent) -> Result<()>;
    async fn count_analytics(&self, filter: &AnalyticsFilter) -> Result<u64>;
    /// A page of analytics events, newest first.
    async fn recent_analytics(&self, skip: u64, limit: u64) -> Result<Vec<AnalyticsEvent>>;
}

/// Open the store named by `dsn`.
///
/// `memory://` keeps everything in process; `postgres://` and `postgresql://`
/// connect a pool and apply the bundled schema.
///
/// # Errors
/// Returns an error for unknown schemes or when the database is unreachable.
pub async fn connect(dsn: &str) -> Result<SharedStore> {
    let scheme = dsn.split_once("://").map(|(scheme, _)| scheme);
    match scheme {
        Some("memory") => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        Some("postgres" | "postgresql") => {
            let store = PgStore::connect(dsn).await?;
            store.apply_schema().await?;
            Ok(Arc::new(store))
        }
        _ => Err(anyhow!(
            "Unsupported DSN scheme, expected postgres:// or memory://"
        )),
    }
}
