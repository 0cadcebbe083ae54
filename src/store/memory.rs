//! In-process store for local development and tests.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    InsertOutcome, Store,
    models::{AnalyticsEvent, AnalyticsFilter, Event, Inquiry, Role, User},
};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    events: Vec<Event>,
    inquiries: Vec<Inquiry>,
    // insertion order is the natural storage order
    analytics: Vec<AnalyticsEvent>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_user(&self, identifier: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|user| user.identifier == identifier)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<InsertOutcome> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .iter()
            .any(|existing| existing.identifier == user.identifier)
        {
            return Ok(InsertOutcome::Conflict);
        }
        inner.users.push(user.clone());
        Ok(InsertOutcome::Created)
    }

    async fn count_users(&self, role: Role) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(count(
            inner.users.iter().filter(|user| user.role == role).count(),
        ))
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let inner = self.inner.read().await;
        let mut events = inner.events.clone();
        events.sort_by_key(|event| event.date);
        Ok(events)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|event| event.id == id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        self.inner.write().await.events.push(event.clone());
        Ok(())
    }

    async fn replace_event(&self, event: &Event) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.events.iter_mut().find(|stored| stored.id == event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.events.len();
        inner.events.retain(|event| event.id != id);
        Ok(inner.events.len() != before)
    }

    async fn count_events(&self) -> Result<u64> {
        Ok(count(self.inner.read().await.events.len()))
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<()> {
        self.inner.write().await.inquiries.push(inquiry.clone());
        Ok(())
    }

    async fn list_inquiries(&self) -> Result<Vec<Inquiry>> {
        let inner = self.inner.read().await;
        let mut inquiries: Vec<Inquiry> = inner.inquiries.iter().rev().cloned().collect();
        inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(inquiries)
    }

    async fn count_inquiries(&self) -> Result<u64> {
        Ok(count(self.inner.read().await.inquiries.len()))
    }

    async fn insert_analytics(&self, event: &AnalyticsEvent) -> Result<()> {
        self.inner.write().await.analytics.push(event.clone());
        Ok(())
    }

    async fn count_analytics(&self, filter: &AnalyticsFilter) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(count(
            inner
                .analytics
                .iter()
                .filter(|event| filter.matches(event))
                .count(),
        ))
    }

    async fn recent_analytics(&self, skip: u64, limit: u64) -> Result<Vec<AnalyticsEvent>> {
        let inner = self.inner.read().await;
        let mut events: Vec<&AnalyticsEvent> = inner.analytics.iter().rev().collect();
        // stable: equal timestamps keep newest-inserted first
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(events.into_iter().skip(skip).take(limit).cloned().collect())
    }
}
