//! HTTP server setup and configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use crate::config::Config;
use crate::recommender::RecommenderClient;

/// Response header: correlation ID (UUID v4).
pub const REQUEST_ID_HEADER: &str = "x-medrelay-request-id";

/// Correlation ID attached to every request.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<RecommenderClient>,
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        // The chat widget may be served from any origin.
        .layer(CorsLayer::permissive())
}

/// Assign a correlation ID to the request and echo it on the response.
async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        HeaderName::from_static(REQUEST_ID_HEADER),
        HeaderValue::from_str(&request_id.0.to_string()).unwrap(),
    );
    response
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    // HTTP client with bounded timeouts; a timed-out provider call is just
    // another failure masked by the fallback.
    let http_client = Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let recommender = RecommenderClient::new(http_client, config.provider.clone());

    let state = AppState {
        recommender: Arc::new(recommender),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting medrelay server");

    axum::serve(listener, app).await?;

    Ok(())
}
