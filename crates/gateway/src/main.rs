//! aiXiv Catalog Gateway
//!
//! Serves the submission catalog to readers.
//! Handles:
//! - One-shot list pages and home-page highlights
//! - Stateful list views (query, ordering, pagination, retry)
//! - Rate limiting
//! - Observability (logging, metrics)

mod extract;
mod handlers;
mod middleware;
mod views;

use axum::{
    routing::{get, post, put},
    Router,
};
use aixiv_common::{
    config::AppConfig,
    errors::Result as AppResult,
    metrics, HttpSubmissionSource, SubmissionSource,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::middleware::rate_limit::{create_rate_limiter, rate_limit_middleware, RateLimit};
use crate::views::ViewRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub source: Arc<dyn SubmissionSource>,
    pub views: Arc<ViewRegistry>,
    pub rate_limit: Option<RateLimit>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, source: Arc<dyn SubmissionSource>) -> AppResult<Self> {
        Ok(Self {
            views: Arc::new(ViewRegistry::from_config(&config.catalog)),
            rate_limit: create_rate_limiter(&config.rate_limit)?,
            config,
            source,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    info!("Starting aiXiv Catalog Gateway v{}", aixiv_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        PrometheusBuilder::new()
            .set_buckets(metrics::LATENCY_BUCKETS)?
            .with_http_listener(([0, 0, 0, 0], config.observability.metrics_port))
            .install()?;
        info!(port = config.observability.metrics_port, "Prometheus exporter listening");
    }

    // Submission backend
    let source = HttpSubmissionSource::new(&config.backend)?;
    info!(backend = %source.base_url(), "Using submission backend");

    let state = AppState::new(config.clone(), Arc::new(source))?;

    // Build the router
    let app = create_router(state);

    // Start the server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown = CancellationToken::new();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_signal() => {
            shutdown.cancel();
            match tokio::time::timeout(config.shutdown_timeout(), server).await {
                Ok(result) => result?,
                Err(_) => warn!("Graceful shutdown timed out, dropping open connections"),
            }
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Catalog endpoints
        .route("/catalog", get(handlers::catalog::list))
        .route("/highlights", get(handlers::highlights::highlights))

        // View session endpoints
        .route("/views", post(handlers::views::create_view))
        .route(
            "/views/{id}",
            get(handlers::views::get_view).delete(handlers::views::delete_view),
        )
        .route("/views/{id}/query", put(handlers::views::update_query))
        .route("/views/{id}/page", put(handlers::views::set_page))
        .route("/views/{id}/retry", post(handlers::views::retry))
        .route_layer(axum::middleware::from_fn(middleware::track_metrics));

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
