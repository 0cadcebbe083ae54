//! Auth configuration and the shared state handed to handlers.

use secrecy::{ExposeSecret, SecretString};

use super::codec::{CodecError, SessionCodec};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";

/// Lifetime of the cookie issued by a successful login.
pub const LOGIN_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
    secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRONTEND_BASE_URL.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure_cookies: false,
        }
    }

    /// Sliding lifetime applied each time the gate re-issues the cookie.
    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    codec: SessionCodec,
}

impl AuthState {
    /// # Errors
    /// Returns [`CodecError::EmptySecret`] when the secret is empty.
    pub fn new(config: AuthConfig, secret: &SecretString) -> Result<Self, CodecError> {
        let codec = SessionCodec::new(secret.expose_secret().as_bytes())?;
        Ok(Self { config, codec })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }
}
