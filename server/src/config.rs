//! Runtime configuration loaded from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default except the credential source. `main` calls
//! `dotenvy::dotenv()` first, so a local `.env` file feeds the same lookup.
//! Unparseable numeric values fall back to their defaults.

use std::collections::HashMap;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CLIENT_CHANNEL_CAPACITY: usize = 256;
const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 8192;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no credential source: set AUTH_TOKENS or DATABASE_URL")]
    NoCredentialSource,
    #[error("malformed AUTH_TOKENS entry: {0:?}")]
    MalformedToken(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Absent means strokes and chats live in memory only.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Bounded outbound queue per websocket connection.
    pub client_channel_capacity: usize,
    /// Bounded queue in front of the single persistence writer.
    pub persist_queue_capacity: usize,
    /// Static `token -> user id` table. When set it replaces session lookup.
    pub auth_tokens: Option<HashMap<String, String>>,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `AUTH_TOKENS` is malformed or neither
    /// `AUTH_TOKENS` nor `DATABASE_URL` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env_non_empty("DATABASE_URL");
        let auth_tokens = env_non_empty("AUTH_TOKENS").map(|raw| parse_auth_tokens(&raw)).transpose()?;

        if database_url.is_none() && auth_tokens.is_none() {
            return Err(ConfigError::NoCredentialSource);
        }

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            client_channel_capacity: env_parse("CLIENT_CHANNEL_CAPACITY", DEFAULT_CLIENT_CHANNEL_CAPACITY).max(1),
            persist_queue_capacity: env_parse("PERSIST_QUEUE_CAPACITY", DEFAULT_PERSIST_QUEUE_CAPACITY).max(1),
            auth_tokens,
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse `"tok-a:alice,tok-b:bob"` into a token table.
pub(crate) fn parse_auth_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((token, user_id)) = entry.split_once(':') else {
            return Err(ConfigError::MalformedToken(entry.to_owned()));
        };
        let (token, user_id) = (token.trim(), user_id.trim());
        if token.is_empty() || user_id.is_empty() {
            return Err(ConfigError::MalformedToken(entry.to_owned()));
        }
        tokens.insert(token.to_owned(), user_id.to_owned());
    }
    Ok(tokens)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
