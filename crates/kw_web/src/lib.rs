use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod cms;
pub mod error;
pub mod handlers;
pub mod optimize;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/keywords/:type", get(handlers::list_keywords))
        .route("/contensis/submit", post(handlers::submit_to_cms))
        .route("/optimize", post(handlers::optimize))
        .route("/feedback", post(handlers::feedback));

    let router = match static_dir {
        Some(dir) => {
            let index = dir.join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 App running on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

pub mod prelude {
    pub use crate::cms::{CmsClient, CmsConfig};
    pub use crate::optimize::{default_quotas, OptimizeService};
    pub use crate::AppState;
    pub use kw_core::{Error, Result};
}
