//! # Marquee (events promoter back office)
//!
//! `marquee` serves the JSON API and the admin console behind a live-events
//! promotion website: event listings, inquiries, contact capture, page-view
//! analytics, and a dashboard that aggregates all of them.
//!
//! ## Sessions
//!
//! Admin sessions are stateless. Login issues an HS256-signed token carrying the
//! user id, email, role, display name and an absolute expiry; the token lives in
//! the `session` cookie and nowhere else. Every page under `/admin` passes
//! through a gate that re-issues the cookie with a fresh expiry, so an active
//! admin stays signed in while an idle one eventually drops back to the login
//! page.
//!
//! There is no revocation list. Logging out removes the cookie from the issuing
//! browser only; a copied token stays valid until it expires.
//!
//! ## Storage
//!
//! Handlers talk to a [`store::Store`]. Production runs on `PostgreSQL`
//! (`postgres://` DSN); `memory://` keeps everything in process for local
//! development and tests.
//!
//! ## Dashboard numbers
//!
//! Dashboard counters are independent queries, not a transactional snapshot.
//! "Tickets sold" is the number of `ticket_waitlist` form submissions whose
//! metadata names the event title exactly; renaming an event detaches its
//! history.

pub mod api;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
