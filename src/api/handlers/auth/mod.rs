//! Admin authentication.
//!
//! ## Sessions
//!
//! Login signs an HS256 token with the configured secret and stores it in the
//! `session` cookie for 24 hours. The admin pages sit behind [`gate`], which
//! re-issues the cookie on every page view with the configured sliding TTL.
//! JSON endpoints use [`principal::require_admin`] and answer 401 instead of
//! redirecting.
//!
//! Nothing about a session is stored server side, so logout only clears the
//! cookie in the calling browser.
//!
//! ## Seeding
//!
//! When both admin credentials are configured, [`seed::seed_admin`] creates
//! the account at startup. It never overwrites an existing password.

pub(crate) mod codec;
pub(crate) mod gate;
pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod seed;
pub(crate) mod session;
mod state;
pub(crate) mod types;

pub use codec::{CodecError, SessionClaims, SessionCodec, SessionUser};
pub use seed::{SeedOutcome, seed_admin};
pub use state::{AuthConfig, AuthState, LOGIN_SESSION_TTL_SECONDS};

#[cfg(test)]
mod tests;
