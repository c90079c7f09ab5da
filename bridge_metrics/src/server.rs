use crate::exporters::{ProcessMetrics, PrometheusExporter, CONTENT_TYPE};
use crate::registry::MetricRegistry;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use bridge_core::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    start_time: Instant,
    registry: MetricRegistry,
    process: Option<Arc<ProcessMetrics>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
    pub updates_total: u64,
}

/// HTTP endpoint serving the registry in Prometheus text format.
pub struct ExpositionServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    registry: MetricRegistry,
    process: Option<Arc<ProcessMetrics>>,
}

impl ExpositionServer {
    /// Binds the listener right away so the endpoint is reachable before the
    /// first refresh cycle has finished.
    pub async fn bind(addr: SocketAddr, registry: MetricRegistry) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BridgeError::ExpositionBindFailed { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| BridgeError::ExpositionBindFailed { addr, source })?;

        Ok(Self {
            listener,
            local_addr,
            registry,
            process: None,
        })
    }

    pub fn with_process_metrics(mut self, metrics: ProcessMetrics) -> Self {
        self.process = Some(Arc::new(metrics));
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn router(&self) -> Router {
        router(self.registry.clone(), self.process.clone())
    }

    /// Serves until `shutdown` is cancelled, then stops accepting connections
    /// and gives in-flight requests at most `drain_timeout` to finish.
    pub async fn serve(self, shutdown: CancellationToken, drain_timeout: Duration) -> Result<()> {
        let app = self.router();
        info!("Serving metrics on http://{}/metrics", self.local_addr);

        let token = shutdown.clone();
        let server = axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result.map_err(BridgeError::from),
            _ = shutdown.cancelled() => {
                match tokio::time::timeout(drain_timeout, &mut server).await {
                    Ok(result) => {
                        info!("Exposition server stopped");
                        result.map_err(BridgeError::from)
                    }
                    Err(_) => {
                        warn!("Exposition server did not drain within {:?}, closing", drain_timeout);
                        Ok(())
                    }
                }
            }
        }
    }
}

pub fn router(registry: MetricRegistry, process: Option<Arc<ProcessMetrics>>) -> Router {
    let state = AppState {
        start_time: Instant::now(),
        registry,
        process,
    };

    Router::new()
        .route("/", get(metrics))
        .route("/metrics", get(metrics))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.registry.snapshot().await;
    let mut body = PrometheusExporter::format(&snapshot);
    if let Some(process) = &state.process {
        body.push_str(&process.render());
    }

    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        updates_total: state.registry.updates_total().await,
    })
}
