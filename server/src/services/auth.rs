//! Credential verification for websocket handshakes and REST mutations.
//!
//! Two verifiers share one trait: a Postgres session lookup for deployed
//! servers and a fixed token table for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use frames::UserId;
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer credential to a user id. `Ok(None)` means the
    /// credential is unknown or expired.
    async fn verify(&self, token: &str) -> Result<Option<UserId>, AuthError>;
}

/// Looks tokens up in `sessions`, honoring `expires_at`.
pub struct SessionTokenVerifier {
    pool: PgPool,
}

impl SessionTokenVerifier {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenVerifier for SessionTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<UserId>, AuthError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > now()")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(user_id,)| user_id))
    }
}

/// Fixed `token -> user id` table, typically from `AUTH_TOKENS`.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenVerifier {
    #[must_use]
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<UserId>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self.tokens.get(token).cloned())
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
