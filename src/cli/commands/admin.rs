//! Credentials for the administrator account created at startup.

use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email of the administrator to create if missing")
                .env("MARQUEE_ADMIN_EMAIL"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password for the administrator created at startup")
                .env("MARQUEE_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Both values, or `None` when either is missing or blank.
#[must_use]
pub fn credentials(matches: &ArgMatches) -> Option<Credentials> {
    let email = matches
        .get_one::<String>(ARG_ADMIN_EMAIL)
        .map(|email| email.trim())
        .filter(|email| !email.is_empty())?;
    let password = matches
        .get_one::<String>(ARG_ADMIN_PASSWORD)
        .filter(|password| !password.is_empty())?;
    Some(Credentials {
        email: email.to_string(),
        password: SecretString::from(password.clone()),
    })
}
