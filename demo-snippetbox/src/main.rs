use std::sync::Arc;
use std::time::Duration;

use snippetbox::{
    MemorySnippetStore, MemoryUserStore, SESSION_CLEANUP_INTERVAL, SESSION_COOKIE_SECURE,
    SessionConfig, SessionManager, spawn_cleanup_task, store_from_env,
};
use snippetbox_axum::{AppState, PipelineConfig, app};

mod server;

use crate::server::{TlsFiles, cookie_secure, init_tracing, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install default CryptoProvider for rustls to prevent:
    // "no process-level CryptoProvider available -- call CryptoProvider::install_default() before this point"
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    init_tracing(env!("CARGO_CRATE_NAME"));

    let store = store_from_env().await?;
    let _cleanup = spawn_cleanup_task(
        store.clone(),
        Duration::from_secs(*SESSION_CLEANUP_INTERVAL),
    );

    let tls = TlsFiles::from_env();
    let explicit_secure = std::env::var_os("SESSION_COOKIE_SECURE")
        .is_some()
        .then_some(*SESSION_COOKIE_SECURE);
    let session_config = SessionConfig {
        cookie_secure: cookie_secure(tls.is_some(), explicit_secure),
        ..SessionConfig::default()
    };

    let state = AppState::new(
        SessionManager::new(store, session_config),
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemorySnippetStore::new()),
        PipelineConfig::default(),
    );

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(4000);

    serve(port, tls, app(state)).await
}
