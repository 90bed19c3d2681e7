//! Same-origin relay between the energy forecast form and the upstream
//! prediction endpoint.
//!
//! `POST /api/predict` takes `{ "data": { ...14 features... } }`, forwards
//! `data` to the configured endpoint and answers with
//! `{ "success": true, "prediction": ... }` or a failure body.

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod envelope;
pub mod error;
pub mod features;
pub mod relay;
pub mod routes;
pub mod types;

use config::RelayConfig;
use relay::Relay;
use routes::{features_handler, form_handler, health_handler, predict_handler, AppState};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict", post(predict_handler))
        .route("/api/predict/form", post(form_handler))
        .route("/api/features", get(features_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let relay = Relay::new(&config)?;
    info!(
        endpoint = relay.endpoint(),
        timeout_ms = config.timeout.as_millis() as u64,
        "relay configured"
    );

    let app = router(AppState::new(relay));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(err) => {
                warn!("failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                warn!("failed to install terminate handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
