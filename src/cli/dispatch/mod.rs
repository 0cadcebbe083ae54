use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_DSN, ARG_PORT, admin, auth},
};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing or empty.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let options = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        session_secret: options.session_secret,
        session_ttl_seconds: options.session_ttl_seconds,
        secure_cookies: options.secure_cookies,
        frontend_base_url: options.frontend_base_url,
        admin: admin::credentials(matches),
    }))
}
