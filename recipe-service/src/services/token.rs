//! Opaque API tokens.
//!
//! Keys are 40 hex characters drawn from the OS RNG. Each user holds at most
//! one key; issuing again returns the existing one. Keys do not expire and
//! stay valid until revoked.

use rand::{rngs::OsRng, RngCore};

use crate::{
    models::{AuthToken, User},
    services::{Database, ServiceError},
};

const KEY_BYTES: usize = 20;
const KEY_LEN: usize = KEY_BYTES * 2;

#[derive(Clone)]
pub struct TokenService {
    db: Database,
}

impl TokenService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Return the user's token, creating it on first use.
    pub async fn issue_token(&self, user: &User) -> Result<AuthToken, ServiceError> {
        if let Some(token) = self.db.find_token_for_user(user.id).await? {
            return Ok(token);
        }

        let key = generate_key();
        self.db.insert_token_if_absent(&key, user.id).await?;

        // Re-read: a concurrent request may have won the insert
        let token = self
            .db
            .find_token_for_user(user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Token for user {} vanished after insert", user.id))?;

        tracing::info!(user_id = user.id, "Token issued");
        Ok(token)
    }

    /// Resolve a presented key to an active user.
    pub async fn resolve_token(&self, key: Option<&str>) -> Result<User, ServiceError> {
        let key = match key.map(str::trim) {
            None | Some("") => return Err(ServiceError::MissingToken),
            Some(key) => key,
        };

        if !is_well_formed(key) {
            return Err(ServiceError::InvalidToken);
        }

        match self.db.find_user_by_token(key).await? {
            Some(user) if user.is_active => Ok(user),
            Some(user) => {
                tracing::debug!(user_id = user.id, "Token presented for inactive user");
                Err(ServiceError::InvalidToken)
            }
            None => Err(ServiceError::InvalidToken),
        }
    }

    /// Delete the user's token. Returns the number of keys removed.
    pub async fn revoke_tokens(&self, user_id: i64) -> Result<u64, ServiceError> {
        let removed = self.db.delete_tokens_for_user(user_id).await?;
        if removed > 0 {
            tracing::info!(user_id, "Token revoked");
        }
        Ok(removed)
    }
}

fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn is_well_formed(key: &str) -> bool {
    key.len() == KEY_LEN && key.bytes().all(|b| b.is_ascii_hexdigit())
}
