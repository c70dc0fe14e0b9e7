use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub(crate) struct TlsFiles {
    pub cert: String,
    pub key: String,
}

impl TlsFiles {
    /// Both TLS_CERT and TLS_KEY must be set to serve HTTPS.
    pub(crate) fn from_env() -> Option<Self> {
        let cert = std::env::var("TLS_CERT").ok()?;
        let key = std::env::var("TLS_KEY").ok()?;
        Some(Self { cert, key })
    }
}

/// Secure cookies are never sent back over plain HTTP, so without TLS the flag
/// defaults off unless SESSION_COOKIE_SECURE is set explicitly.
pub(crate) fn cookie_secure(tls: bool, explicit: Option<bool>) -> bool {
    match explicit {
        Some(secure) => {
            if secure && !tls {
                tracing::warn!(
                    "SESSION_COOKIE_SECURE=true without TLS; browsers will drop the session cookie"
                );
            }
            secure
        }
        None => tls,
    }
}

pub(crate) async fn serve(
    port: u16,
    tls: Option<TlsFiles>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    match tls {
        Some(tls) => {
            let config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, config).serve(service).await?;
        }
        None => {
            tracing::warn!("TLS_CERT/TLS_KEY not set; serving plain HTTP");
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr).serve(service).await?;
        }
    }

    Ok(())
}

pub(crate) fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!("snippetbox_axum=debug,snippetbox=debug,{app_name}=debug,info").into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    #[cfg(debug_assertions)]
    tracing::info!("Debug mode enabled - showing detailed logs by default");
    tracing::info!("You can increase verbosity by setting the RUST_LOG environment variable.");
}
