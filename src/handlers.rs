use crate::config::Config;
use crate::errors::{AppError, ErrorBody};
use crate::lookup::{LookupOutcome, LookupService};
use crate::models::{LookupParams, LookupRequest};
use crate::talent_client::TalentClient;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, including the upstream API key.
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "hacker-house-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/talent-protocol
///
/// Resolves `identifier` to a Talent Protocol profile and returns it, or its
/// builder score / credentials when `action` asks for them. A derived resource
/// that cannot be fetched falls back to the profile, flagged with
/// `x-lookup-degraded: true`.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `params` - Query parameters (`identifier`, optional `action`).
///
/// # Returns
///
/// * `Result<LookupOutcome, AppError>` - The JSON payload or an error.
#[utoipa::path(
    get,
    path = "/api/talent-protocol",
    tag = "talent-protocol",
    params(LookupParams),
    responses(
        (status = 200, description = "Resolved profile, builder score or credentials"),
        (status = 400, description = "Identifier parameter is required", body = ErrorBody),
        (status = 404, description = "Profile not found", body = ErrorBody),
        (status = 500, description = "API key not configured or internal failure", body = ErrorBody)
    )
)]
pub async fn talent_protocol_lookup(
    State(state): State<Arc<AppState>>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Result<LookupOutcome, AppError> {
    // An undecodable query string is treated like an empty one
    let params = query
        .map(|Query(pairs)| LookupParams::from_pairs(pairs))
        .unwrap_or_default();
    tracing::info!(
        "GET /api/talent-protocol - identifier: {:?}, action: {:?}",
        params.identifier,
        params.action
    );

    // Key check runs first: a missing key is a 500 whatever the inputs are
    let client = TalentClient::from_config(&state.config)?;
    let request = LookupRequest::from_params(params)?;

    let outcome = LookupService::new(client).lookup(&request).await?;

    tracing::info!(
        "Lookup for {} served {} (degraded: {})",
        request.identifier,
        outcome.source(),
        outcome.is_degraded()
    );

    Ok(outcome)
}
