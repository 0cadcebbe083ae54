use crate::{
    api::{self, AuthConfig, AuthState, SeedOutcome, seed_admin},
    cli::commands::admin::Credentials,
    store,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub secure_cookies: bool,
    pub frontend_base_url: String,
    pub admin: Option<Credentials>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the session secret is unusable, the store cannot be
/// reached, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        port = args.port,
        session_ttl_seconds = args.session_ttl_seconds,
        secure_cookies = args.secure_cookies,
        frontend_base_url = %args.frontend_base_url,
        "Starting marquee"
    );

    let config = AuthConfig::new(args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_secure_cookies(args.secure_cookies);
    let auth_state =
        AuthState::new(config, &args.session_secret).context("Invalid session secret")?;

    let store = store::connect(&args.dsn).await?;

    match &args.admin {
        Some(admin) => match seed_admin(&*store, &admin.email, &admin.password).await {
            Ok(SeedOutcome::Created) => info!(email = %admin.email, "Admin account created"),
            Ok(SeedOutcome::AlreadyExists) => {
                debug!(email = %admin.email, "Admin account already exists");
            }
            // The API still serves public routes without an administrator.
            Err(err) => error!("Failed to seed admin account: {err:#}"),
        },
        None => warn!("Admin credentials not set, skipping admin seeding"),
    }

    api::new(args.port, store, Arc::new(auth_state)).await
}
