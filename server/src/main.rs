use std::{net::SocketAddr, sync::Arc};

use axum_server::{Handle, tls_rustls::RustlsConfig};
use control_service::{AppState, create_router};
use datastore::InMemoryVideoStore;
use identity::InMemoryAuthBackend;
use preferences::{FilePreferenceStore, SiteSettings};
use tokio::{net::TcpListener, signal::ctrl_c};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

mod config;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load()?;

    info!("Initializing state...");
    let settings = SiteSettings::load(Arc::new(FilePreferenceStore::open(
        &config.preferences_path,
    )?))?;
    let state = AppState::new(
        Arc::new(InMemoryAuthBackend::new(config.session_ttl)),
        Arc::new(InMemoryVideoStore::new()),
        Arc::new(settings),
    );
    let app = create_router(state);

    let address = config.address();

    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "Failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            let addr: SocketAddr = address.parse()?;

            let handle = Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(None);
            });

            info!("Server listening on https://{address}");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(&address).await?;
            info!("Server listening on http://{address}");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
