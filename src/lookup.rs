//! Resolve-then-derive identity lookup.
//!
//! Talent Protocol keys scores and credentials by its own profile id, not by
//! the wallet/ENS/username a caller knows. A lookup therefore runs as a
//! two-stage pipeline: an exact-match search resolves the caller's identifier
//! to one profile, then (for `score` and `credentials`) a second call fetches
//! the derived resource for that profile.
//!
//! A failed derive call does not fail the lookup. The caller gets the resolved
//! profile and the outcome is marked degraded.

use crate::errors::AppError;
use crate::models::{LookupAction, LookupRequest, ResolvedProfile, PROFILE_NOT_FOUND_MESSAGE};
use crate::talent_client::TalentClient;
use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Set to `true` on responses that fell back to the resolved profile.
pub const DEGRADED_HEADER: HeaderName = HeaderName::from_static("x-lookup-degraded");
/// Names the resource held in the response body.
pub const SOURCE_HEADER: HeaderName = HeaderName::from_static("x-lookup-source");

/// Terminal result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Profile requested and resolved.
    Profile(Value),
    /// Derived resource fetched for the resolved profile.
    Derived { action: LookupAction, body: Value },
    /// Derived resource requested but unavailable; carries the resolved profile.
    Degraded {
        action: LookupAction,
        profile: Value,
        reason: String,
    },
}

impl LookupOutcome {
    /// JSON returned to the caller.
    pub fn body(&self) -> &Value {
        match self {
            LookupOutcome::Profile(profile) => profile,
            LookupOutcome::Derived { body, .. } => body,
            LookupOutcome::Degraded { profile, .. } => profile,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, LookupOutcome::Degraded { .. })
    }

    /// Resource the body holds: the derived one, or `profile` for fallbacks.
    pub fn source(&self) -> LookupAction {
        match self {
            LookupOutcome::Derived { action, .. } => *action,
            LookupOutcome::Profile(_) | LookupOutcome::Degraded { .. } => LookupAction::Profile,
        }
    }
}

impl IntoResponse for LookupOutcome {
    fn into_response(self) -> Response {
        let source = HeaderValue::from_static(self.source().as_str());
        let degraded = self.is_degraded();
        let body = match self {
            LookupOutcome::Profile(profile) => profile,
            LookupOutcome::Derived { body, .. } => body,
            LookupOutcome::Degraded { profile, .. } => profile,
        };

        let mut response = Json(body).into_response();
        let headers = response.headers_mut();
        headers.insert(SOURCE_HEADER, source);
        if degraded {
            headers.insert(DEGRADED_HEADER, HeaderValue::from_static("true"));
        }
        response
    }
}

/// Runs lookups against one Talent Protocol client.
pub struct LookupService {
    client: TalentClient,
}

impl LookupService {
    pub fn new(client: TalentClient) -> Self {
        Self { client }
    }

    /// Resolves the identifier and, when the action asks for it, the derived resource.
    ///
    /// # Errors
    ///
    /// * `AppError::NotFound` when the search has no result (no derive call is made).
    /// * `AppError::Upstream` when the search answers with a non-success status.
    /// * `AppError::ExternalApiError` on transport or decoding failures of the search.
    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupOutcome, AppError> {
        let profile = self.resolve(&request.identifier).await?;

        if !request.action.needs_derive() {
            return Ok(LookupOutcome::Profile(profile.raw));
        }

        let Some(profile_id) = profile.profile_id.as_deref() else {
            tracing::warn!(
                "Resolved profile for {} has no profile id; returning profile instead of {}",
                request.identifier,
                request.action
            );
            return Ok(LookupOutcome::Degraded {
                action: request.action,
                reason: "resolved profile has no id".to_string(),
                profile: profile.raw,
            });
        };

        match self.derive(request.action, profile_id).await {
            Ok(body) => Ok(LookupOutcome::Derived {
                action: request.action,
                body,
            }),
            Err(e) => {
                tracing::warn!(
                    "Talent {} lookup failed for profile {}, falling back to profile: {}",
                    request.action,
                    profile_id,
                    e
                );
                Ok(LookupOutcome::Degraded {
                    action: request.action,
                    reason: e.to_string(),
                    profile: profile.raw,
                })
            }
        }
    }

    /// Step 1: exact-match search, best result wins.
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedProfile, AppError> {
        let search = self.client.search_profiles(identifier).await?;

        let profile = search.into_first().ok_or_else(|| {
            tracing::info!("No Talent Protocol profile matches {}", identifier);
            AppError::NotFound(PROFILE_NOT_FOUND_MESSAGE.to_string())
        })?;

        tracing::info!(
            "Resolved {} to Talent profile {:?}",
            identifier,
            profile.profile_id
        );
        Ok(profile)
    }

    /// Step 2: derived resource keyed by the resolved profile id.
    async fn derive(&self, action: LookupAction, profile_id: &str) -> Result<Value, AppError> {
        match action {
            LookupAction::Score => self.client.fetch_score(profile_id).await,
            LookupAction::Credentials => self.client.fetch_credentials(profile_id).await,
            LookupAction::Profile => Err(AppError::InternalError(
                "profile action has no derived resource".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_outcome_body_and_source() {
        let profile = json!({"id": "p1"});
        let score = json!({"score": {"points": 88}});

        let outcome = LookupOutcome::Profile(profile.clone());
        assert_eq!(outcome.body(), &profile);
        assert_eq!(outcome.source(), LookupAction::Profile);
        assert!(!outcome.is_degraded());

        let outcome = LookupOutcome::Derived {
            action: LookupAction::Score,
            body: score.clone(),
        };
        assert_eq!(outcome.body(), &score);
        assert_eq!(outcome.source(), LookupAction::Score);

        let outcome = LookupOutcome::Degraded {
            action: LookupAction::Credentials,
            profile: profile.clone(),
            reason: "503".to_string(),
        };
        assert_eq!(outcome.body(), &profile);
        assert_eq!(outcome.source(), LookupAction::Profile);
        assert!(outcome.is_degraded());
    }

    #[test]
    fn test_degraded_response_is_flagged_in_headers() {
        let response = LookupOutcome::Degraded {
            action: LookupAction::Score,
            profile: json!({"id": "p1"}),
            reason: "timeout".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[&DEGRADED_HEADER], "true");
        assert_eq!(response.headers()[&SOURCE_HEADER], "profile");
    }

    #[test]
    fn test_clean_response_has_no_degraded_header() {
        let response = LookupOutcome::Derived {
            action: LookupAction::Credentials,
            body: json!({"credentials": []}),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(&DEGRADED_HEADER).is_none());
        assert_eq!(response.headers()[&SOURCE_HEADER], "credentials");
    }
}
