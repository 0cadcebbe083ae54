//! Administrator provisioning at startup.

use anyhow::{Context, Result};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::password::hash_password;
use crate::store::{InsertOutcome, Role, Store, User};

pub const SEEDED_ADMIN_NAME: &str = "Admin User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyExists,
}

/// Create the administrator account named by `email` unless it already
/// exists. An existing account is never modified.
///
/// # Errors
/// Returns an error if hashing fails or the store is unavailable.
pub async fn seed_admin(store: &dyn Store, email: &str, password: &SecretString) -> Result<SeedOutcome> {
    let email = email.trim();
    if store
        .find_user(email)
        .await
        .context("failed to look up admin account")?
        .is_some()
    {
        info!("Admin account already present");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let mut admin = User::new(email.to_string(), Role::Admin, Utc::now());
    admin.name = Some(SEEDED_ADMIN_NAME.to_string());
    admin.password_hash = Some(hash_password(password.expose_secret())?);

    match store
        .insert_user(&admin)
        .await
        .context("failed to insert admin account")?
    {
        InsertOutcome::Created => {
            info!("Admin account created");
            Ok(SeedOutcome::Created)
        }
        // Another instance won the race.
        InsertOutcome::Conflict => Ok(SeedOutcome::AlreadyExists),
    }
}
