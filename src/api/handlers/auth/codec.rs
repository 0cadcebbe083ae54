//! HS256 session tokens.
//!
//! The token is a compact JWT whose payload carries the signed-in user and an
//! absolute `exp`. Signature verification runs before any claim is trusted, so
//! editing `exp` or truncating the token surfaces as a bad signature rather
//! than a shorter or longer session.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::{Role, User};

/// Identity embedded in a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.identifier.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: SessionUser,
    /// Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("session secret must not be empty")]
    EmptySecret,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("session expired")]
    Expired,
    #[error("malformed session token")]
    Malformed,
    #[error("failed to sign session token")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCodec")
            .field("algorithm", &"HS256")
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    /// # Errors
    /// Returns [`CodecError::EmptySecret`] when `secret` is empty.
    pub fn new(secret: &[u8]) -> Result<Self, CodecError> {
        if secret.is_empty() {
            return Err(CodecError::EmptySecret);
        }

        // `exp` is compared by hand with zero leeway after the signature check.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Sign a token for `user` that expires at `expires_at` (unix seconds).
    ///
    /// # Errors
    /// Returns [`CodecError::Sign`] if the claims cannot be serialized.
    pub fn encode(&self, user: &SessionUser, expires_at: i64) -> Result<String, CodecError> {
        let claims = SessionClaims {
            user: user.clone(),
            exp: expires_at,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(CodecError::Sign)
    }

    /// Verify `token` and return its claims if it is still valid at `now_unix_seconds`.
    ///
    /// # Errors
    /// Returns the reason the token was rejected.
    pub fn decode(&self, token: &str, now_unix_seconds: i64) -> Result<SessionClaims, CodecError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::InvalidSignature => CodecError::InvalidSignature,
                _ => CodecError::Malformed,
            },
        )?;

        if data.claims.exp <= now_unix_seconds {
            return Err(CodecError::Expired);
        }

        Ok(data.claims)
    }
}
