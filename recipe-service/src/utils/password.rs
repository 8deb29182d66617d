use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Shortest password accepted on registration, profile update and the
/// admin CLI.
pub const MIN_PASSWORD_LEN: usize = 5;

/// A plaintext password. `Debug` is redacted so it never reaches the logs.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn ensure_min_length(&self) -> Result<(), anyhow::Error> {
        if self.0.chars().count() < MIN_PASSWORD_LEN {
            anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Argon2id PHC string with a fresh salt, ready for the `password_hash` column.
pub fn hash_password(password: &Password) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Check a login attempt against the stored hash.
///
/// A missing hash is an unusable password and never matches. So does a
/// stored value that is not a valid PHC string.
pub fn password_matches(password: &Password, stored: Option<&str>) -> bool {
    let Some(stored) = stored else {
        return false;
    };

    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_argon2_phc() {
        let hash = hash_password(&Password::new("testpass")).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("testpass"));
    }

    #[test]
    fn matches_only_the_original_password() {
        let password = Password::new("Qwerty12345");
        let hash = hash_password(&password).unwrap();

        assert!(password_matches(&password, Some(&hash)));
        assert!(!password_matches(&Password::new("qwerty"), Some(&hash)));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let password = Password::new("testpass");
        let first = hash_password(&password).unwrap();
        let second = hash_password(&password).unwrap();

        assert_ne!(first, second);
        assert!(password_matches(&password, Some(&second)));
    }

    #[test]
    fn unusable_or_corrupt_hash_never_matches() {
        let password = Password::new("testpass");

        assert!(!password_matches(&password, None));
        assert!(!password_matches(&password, Some("testpass")));
    }

    #[test]
    fn minimum_length_counts_characters() {
        assert!(Password::new("abcd").ensure_min_length().is_err());
        assert!(Password::new("abcde").ensure_min_length().is_ok());
        assert!(Password::new("ééééé").ensure_min_length().is_ok());
    }

    #[test]
    fn debug_is_redacted() {
        assert_eq!(format!("{:?}", Password::new("hunter22")), "Password(***)");
    }
}
