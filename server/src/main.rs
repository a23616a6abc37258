mod config;
mod db;
mod registry;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::auth::{SessionTokenVerifier, StaticTokenVerifier, TokenVerifier};
use services::store::{MemoryStrokeStore, PgStrokeStore, StrokeStore};

#[tokio::main]
async fn main() {
    // A missing .env is the normal production case.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchroom_server=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env().expect("invalid configuration");

    let pool = match &config.database_url {
        Some(url) => Some(
            db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed"),
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; strokes and chats are kept in memory only");
            None
        }
    };

    let store: Arc<dyn StrokeStore> = match &pool {
        Some(pool) => Arc::new(PgStrokeStore::new(pool.clone())),
        None => Arc::new(MemoryStrokeStore::new()),
    };

    let verifier: Arc<dyn TokenVerifier> = match (config.auth_tokens.clone(), pool) {
        (Some(tokens), _) => {
            tracing::info!(count = tokens.len(), "using static token table");
            Arc::new(StaticTokenVerifier::new(tokens))
        }
        (None, Some(pool)) => Arc::new(SessionTokenVerifier::new(pool)),
        (None, None) => panic!("{}", config::ConfigError::NoCredentialSource),
    };

    let (persist_tx, _writer) =
        services::persistence::spawn_persistence_worker(Arc::clone(&store), config.persist_queue_capacity);
    let state = state::AppState::new(store, verifier, persist_tx, config.client_channel_capacity);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "sketchroom listening");
    axum::serve(listener, app).await.expect("server failed");
}
