use anyhow::anyhow;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hashes `plaintext` with Argon2id and a fresh random salt, returning the PHC string.
pub fn hash(plaintext: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Checks `plaintext` against a stored PHC hash. A mismatch is `Ok(false)`;
/// a malformed stored hash is an error.
pub fn verify(stored_hash: &str, plaintext: &str) -> Result<bool, anyhow::Error> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| anyhow!("stored password hash is invalid: {e}"))?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("password verification failed: {e}")),
    }
}

// Argon2 is deliberately slow, keep it off the async workers.

pub async fn hash_blocking(plaintext: String) -> Result<String, anyhow::Error> {
    tokio::task::spawn_blocking(move || hash(&plaintext)).await?
}

pub async fn verify_blocking(stored_hash: String, plaintext: String) -> Result<bool, anyhow::Error> {
    tokio::task::spawn_blocking(move || verify(&stored_hash, &plaintext)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("validpassword").unwrap();
        assert_ne!(hashed, "validpassword");
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify(&hashed, "validpassword").unwrap());
        assert!(!verify(&hashed, "validpassword2").unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash("same password").unwrap();
        let second = hash("same password").unwrap();
        assert_ne!(first, second);
        assert!(verify(&first, "same password").unwrap());
        assert!(verify(&second, "same password").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify("not a phc string", "whatever").is_err());
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hashed = hash_blocking("correct horse".to_owned()).await.unwrap();
        assert!(verify_blocking(hashed.clone(), "correct horse".to_owned())
            .await
            .unwrap());
        assert!(!verify_blocking(hashed, "battery staple".to_owned())
            .await
            .unwrap());
    }
}
