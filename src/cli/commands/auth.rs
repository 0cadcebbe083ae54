//! Session and cookie settings.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

const PRODUCTION: &str = "production";

/// One year.
pub const MAX_SESSION_TTL_SECONDS: i64 = 31_536_000;

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session cookies")
                .env("MARQUEE_SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Idle lifetime of an admin session, refreshed on every admin page view")
                .env("MARQUEE_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; production marks cookies Secure")
                .env("MARQUEE_ENV")
                .default_value("development")
                .value_parser(PossibleValuesParser::new(["development", "test", PRODUCTION])),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Origin of the public site, allowed for credentialed CORS requests")
                .env("MARQUEE_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub secure_cookies: bool,
    pub frontend_base_url: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required value is missing or empty.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .filter(|secret| !secret.is_empty())
            .context("missing required argument: --session-secret")?;

        Ok(Self {
            session_secret: SecretString::from(session_secret.clone()),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            secure_cookies: matches
                .get_one::<String>(ARG_ENVIRONMENT)
                .is_some_and(|environment| environment == PRODUCTION),
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .context("missing required argument: --frontend-base-url")?,
        })
    }
}
