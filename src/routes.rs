use crate::config::Config;
use crate::handlers::{self, AppState};
use crate::openapi::ApiDoc;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Lookups are GETs; anything bigger than 64KB is not a real client.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Routes that sit behind rate limiting in production.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/talent-protocol", get(handlers::talent_protocol_lookup))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// `api_routes` wrapped with the body limit and per-IP rate limiting.
///
/// The limiter keys on proxy headers first, then the peer address, so the app
/// must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn protected_api_routes(config: &Config) -> anyhow::Result<Router<Arc<AppState>>> {
    let replenish = config.rate_limit_replenish_interval();
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .period(replenish)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
    );
    tracing::info!(
        "Rate limiting: {} req/sec per IP (one request every {:?}), burst of {}",
        config.rate_limit_per_second,
        replenish,
        config.rate_limit_burst
    );

    Ok(api_routes().layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    ))
}

/// Final app: health check (never rate limited) plus the given API routes.
pub fn app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
