//! Gateway between a travel booking funnel and the TourPlan hostConnect XML API.
//!
//! JSON requests come in through [`routes`], are answered from the [`cache`] or the
//! static [`catalog`] where possible, and otherwise become hostConnect documents built by
//! [`xml_request`], sent by [`client`] and read back by [`xml_response`].

use axum::http::{header::CONTENT_TYPE, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod routes;
pub mod search;
pub mod state;
pub mod types;
pub mod xml_request;
pub mod xml_response;

pub use cache::{CacheConfig, CacheStatsReport, ResponseCache};
pub use client::{ApiError, ClientConfig, RetryConfig, TourPlanClient, Transport};
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use search::{SearchOutcome, SearchService};
pub use state::AppState;
pub use types::{Product, ProductType, Rate, SearchCriteria};

/// Bind, serve until Ctrl+C or SIGTERM, then stop the cache sweeper.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::new(&config)?;
    let sweeper = ResponseCache::spawn_sweeper(Arc::clone(&state.cache));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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
