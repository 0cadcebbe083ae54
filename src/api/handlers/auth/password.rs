//! Argon2id password hashing.

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use tracing::error;

/// Stand-in hash verified when an account has none, so unknown and
/// password-less accounts cost the same Argon2 work as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("marquee-dummy-password").ok());

/// Hash `password` into a PHC string with a fresh random salt.
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?
        .to_string();
    Ok(hash)
}

/// `false` for a missing hash, a malformed hash, or a mismatch.
///
/// A missing hash is still checked against a dummy hash and then rejected.
#[must_use]
pub fn verify_password(password: &str, stored_hash: Option<&str>) -> bool {
    let Some(stored_hash) = stored_hash else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = matches_hash(password, dummy);
        }
        return false;
    };
    matches_hash(password, stored_hash)
}

fn matches_hash(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Run [`verify_password`] off the async executor.
pub async fn verify_password_blocking(password: String, stored_hash: Option<String>) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, stored_hash.as_deref()))
        .await
    {
        Ok(matches) => matches,
        Err(err) => {
            error!("Password verification task failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() -> Result<()> {
        let hash = hash_password("correct horse")?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", Some(&hash)));
        assert!(!verify_password("wrong horse", Some(&hash)));
        Ok(())
    }

    #[test]
    fn salts_differ_between_hashes() -> Result<()> {
        assert_ne!(hash_password("same")?, hash_password("same")?);
        Ok(())
    }

    #[test]
    fn missing_or_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", None));
        assert!(!verify_password("anything", Some("plaintext")));
        assert!(!verify_password("", Some("")));
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        let dummy = DUMMY_HASH.as_deref();
        assert!(dummy.is_some_and(|hash| hash.starts_with("$argon2id$")));
        assert!(dummy.is_some_and(|hash| PasswordHash::new(hash).is_ok()));
        // Even the dummy's own password never verifies without a stored hash.
        assert!(!verify_password("marquee-dummy-password", None));
    }

    #[tokio::test]
    async fn blocking_variant_matches() -> Result<()> {
        let hash = hash_password("pw")?;
        assert!(verify_password_blocking("pw".to_string(), Some(hash.clone())).await);
        assert!(!verify_password_blocking("nope".to_string(), Some(hash)).await);
        Ok(())
    }
}
