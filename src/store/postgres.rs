//! `PostgreSQL` store backed by a `sqlx` pool.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use sqlx::{
    Connection, PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use std::time::Duration;
use tracing::{Instrument, Span, info_span};
use uuid::Uuid;

use super::{
    InsertOutcome, Store,
    models::{
        AnalyticsEvent, AnalyticsFilter, AnalyticsKind, Coordinates, Event, EventStatus, Inquiry,
        Role, User,
    },
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const EVENT_COLUMNS: &str = "id, title, subtitle, tagline, description, date, doors_open_time, \
    time_string, location, venue, latitude, longitude, image_url, contact_info, ticket_url, \
    theme_color, capacity, status, created_at, updated_at";

fn query_span(operation: &'static str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a small pool to `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be reached.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema.
    ///
    /// # Errors
    /// Returns an error if any statement fails.
    pub async fn apply_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(info_span!(
                "db.migrate",
                db.system = "postgresql",
                db.operation = "DDL"
            ))
            .await
            .context("Failed to apply database schema")?;
        Ok(())
    }

    async fn scalar_count(&self, query: &'static str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(query)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .with_context(|| format!("failed to run count: {query}"))?;
        Ok(to_count(count))
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        identifier: row.try_get("identifier")?,
        password_hash: row.try_get("password_hash")?,
        role: Role::parse(&role).ok_or_else(|| anyhow!("unknown user role: {role}"))?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn event_from_row(row: &PgRow) -> Result<Event> {
    let status: String = row.try_get("status")?;
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let capacity: Option<i32> = row.try_get("capacity")?;
    Ok(Event {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        subtitle: row.try_get("subtitle")?,
        tagline: row.try_get("tagline")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        doors_open_time: row.try_get("doors_open_time")?,
        time_string: row.try_get("time_string")?,
        location: row.try_get("location")?,
        venue: row.try_get("venue")?,
        coordinates: latitude
            .zip(longitude)
            .map(|(lat, lng)| Coordinates { lat, lng }),
        image_url: row.try_get("image_url")?,
        contact_info: row.try_get("contact_info")?,
        ticket_url: row.try_get("ticket_url")?,
        theme_color: row.try_get("theme_color")?,
        capacity: capacity.and_then(|value| u32::try_from(value).ok()),
        status: EventStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown event status: {status}"))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn inquiry_from_row(row: &PgRow) -> Result<Inquiry> {
    Ok(Inquiry {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
    })
}

fn analytics_from_row(row: &PgRow) -> Result<AnalyticsEvent> {
    let kind: String = row.try_get("kind")?;
    Ok(AnalyticsEvent {
        id: row.try_get("id")?,
        kind: AnalyticsKind::parse(&kind)
            .ok_or_else(|| anyhow!("unknown analytics type: {kind}"))?,
        action: row.try_get("action")?,
        metadata: row.try_get("metadata")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .instrument(info_span!(
                "db.acquire",
                db.system = "postgresql",
                db.operation = "ACQUIRE"
            ))
            .await
            .context("Failed to acquire database connection")?;
        conn.ping()
            .instrument(info_span!(
                "db.ping",
                db.system = "postgresql",
                db.operation = "PING"
            ))
            .await
            .context("Failed to ping database")?;
        Ok(())
    }

    async fn find_user(&self, identifier: &str) -> Result<Option<User>> {
        let query = "SELECT id, identifier, password_hash, role, name, created_at \
            FROM users WHERE identifier = $1";
        let row = sqlx::query(query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup user")?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO users (id, identifier, password_hash, role, name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (identifier) DO NOTHING
        ";
        let result = sqlx::query(query)
            .bind(user.id)
            .bind(&user.identifier)
            .bind(user.password_hash.as_deref())
            .bind(user.role.as_str())
            .bind(user.name.as_deref())
            .bind(user.created_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .context("failed to insert user")?;
        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Conflict)
        } else {
            Ok(InsertOutcome::Created)
        }
    }

    async fn count_users(&self, role: Role) -> Result<u64> {
        let query = "SELECT COUNT(*) FROM users WHERE role = $1";
        let count: i64 = sqlx::query_scalar(query)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to count users")?;
        Ok(to_count(count))
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to list events")?;
        rows.iter().map(event_from_row).collect()
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to fetch event")?;
        row.as_ref().map(event_from_row).transpose()
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        let query = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)"
        );
        bind_event(sqlx::query(&query), event)
            .execute(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await
            .context("failed to insert event")?;
        Ok(())
    }

    async fn replace_event(&self, event: &Event) -> Result<bool> {
        let query = r"
            UPDATE events SET
                title = $2, subtitle = $3, tagline = $4, description = $5, date = $6,
                doors_open_time = $7, time_string = $8, location = $9, venue = $10,
                latitude = $11, longitude = $12, image_url = $13, contact_info = $14,
                ticket_url = $15, theme_color = $16, capacity = $17, status = $18,
                created_at = $19, updated_at = $20
            WHERE id = $1
        ";
        let result = bind_event(sqlx::query(query), event)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update event")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let query = "DELETE FROM events WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete event")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_events(&self) -> Result<u64> {
        self.scalar_count("SELECT COUNT(*) FROM events").await
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<()> {
        let query = r"
            INSERT INTO inquiries (id, first_name, last_name, email, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        sqlx::query(query)
            .bind(inquiry.id)
            .bind(&inquiry.first_name)
            .bind(&inquiry.last_name)
            .bind(&inquiry.email)
            .bind(&inquiry.message)
            .bind(inquiry.created_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .context("failed to insert inquiry")?;
        Ok(())
    }

    async fn list_inquiries(&self) -> Result<Vec<Inquiry>> {
        let query = "SELECT id, first_name, last_name, email, message, created_at \
            FROM inquiries ORDER BY created_at DESC";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to list inquiries")?;
        rows.iter().map(inquiry_from_row).collect()
    }

    async fn count_inquiries(&self) -> Result<u64> {
        self.scalar_count("SELECT COUNT(*) FROM inquiries").await
    }

    async fn insert_analytics(&self, event: &AnalyticsEvent) -> Result<()> {
        let query = r"
            INSERT INTO analytics (id, kind, action, metadata, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        sqlx::query(query)
            .bind(event.id)
            .bind(event.kind.as_str())
            .bind(&event.action)
            .bind(event.metadata.as_ref())
            .bind(event.user_id.as_deref())
            .bind(event.created_at)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .context("failed to insert analytics event")?;
        Ok(())
    }

    async fn count_analytics(&self, filter: &AnalyticsFilter) -> Result<u64> {
        let query = r"
            SELECT COUNT(*) FROM analytics
            WHERE ($1::text IS NULL OR kind = $1)
              AND ($2::text IS NULL OR action = $2)
              AND ($3::text IS NULL OR metadata->>'event' = $3)
        ";
        let count: i64 = sqlx::query_scalar(query)
            .bind(filter.kind.map(AnalyticsKind::as_str))
            .bind(filter.action.as_deref())
            .bind(filter.event_title.as_deref())
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to count analytics events")?;
        Ok(to_count(count))
    }

    async fn recent_analytics(&self, skip: u64, limit: u64) -> Result<Vec<AnalyticsEvent>> {
        let query = r"
            SELECT id, kind, action, metadata, user_id, created_at
            FROM analytics
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
        ";
        let rows = sqlx::query(query)
            .bind(to_i64(skip))
            .bind(to_i64(limit))
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to list analytics events")?;
        rows.iter().map(analytics_from_row).collect()
    }
}

fn bind_event<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    event: &'q Event,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(event.id)
        .bind(&event.title)
        .bind(event.subtitle.as_deref())
        .bind(event.tagline.as_deref())
        .bind(event.description.as_deref())
        .bind(event.date)
        .bind(event.doors_open_time.as_deref())
        .bind(event.time_string.as_deref())
        .bind(&event.location)
        .bind(event.venue.as_deref())
        .bind(event.coordinates.map(|c| c.lat))
        .bind(event.coordinates.map(|c| c.lng))
        .bind(event.image_url.as_deref())
        .bind(event.contact_info.as_deref())
        .bind(event.ticket_url.as_deref())
        .bind(&event.theme_color)
        .bind(event.capacity.and_then(|value| i32::try_from(value).ok()))
        .bind(event.status.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Normalize SQL to avoid brittle formatting checks in schema tests.
    fn canonicalize_sql(sql: &str) -> String {
        sql.chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| ch.to_ascii_lowercase())
            .collect()
    }

    #[test]
    fn schema_is_idempotent() {
        for statement in SCHEMA_SQL.split(';').map(str::trim) {
            if statement.is_empty() {
                continue;
            }
            let body = statement
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");
            let canonical = canonicalize_sql(&body);
            assert!(
                canonical.contains("ifnotexists"),
                "statement is not idempotent: {statement}"
            );
        }
    }

    #[test]
    fn schema_enforces_unique_identifier() {
        let canonical = canonicalize_sql(SCHEMA_SQL);
        assert!(canonical.contains("createuniqueindexifnotexistsusers_identifier_keyonusers(identifier)"));
    }

    #[test]
    fn event_columns_match_bind_order() {
        let columns: Vec<&str> = EVENT_COLUMNS.split(',').map(str::trim).collect();
        assert_eq!(columns.len(), 20);
        assert_eq!(columns.first(), Some(&"id"));
        assert_eq!(columns.get(17), Some(&"status"));
        assert_eq!(columns.last(), Some(&"updated_at"));
    }
}
