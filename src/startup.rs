use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::handlers;
use crate::services::{ModelSession, VideoFetcher};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub session: Arc<ModelSession>,
    pub fetcher: VideoFetcher,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the application around an already-initialized session.
    /// The session is injected so the process owner decides when (and
    /// whether) the model gets loaded.
    pub async fn build(
        config: ServiceConfig,
        session: Arc<ModelSession>,
    ) -> Result<Self, AppError> {
        let fetcher = VideoFetcher::new(config.fetcher.temp_dir.clone());

        let state = AppState {
            config: config.clone(),
            session,
            fetcher,
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/generate", post(handlers::generate))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
