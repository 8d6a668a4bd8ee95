use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ProfileSearchResponse, SearchQuery, SearchSort};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Scoring model requested on the score endpoint.
pub const BUILDER_SCORE_SLUG: &str = "builder_score";

const API_KEY_HEADER: &str = "X-API-KEY";

/// Client for the Talent Protocol REST API.
///
/// Every resource besides search is keyed by the internal profile id, so
/// callers resolve first and then fetch derived resources with that id.
#[derive(Clone)]
pub struct TalentClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TalentClient {
    /// Creates a new `TalentClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Talent Protocol API.
    /// * `api_key` - The server-held API key sent as `X-API-KEY`.
    /// * `timeout` - Per-call timeout.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create Talent client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Builds a client from configuration, failing when no key is configured.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = config.talent_api_key.clone().ok_or_else(|| {
            AppError::Configuration("Talent Protocol API key not configured".to_string())
        })?;

        Self::new(
            config.talent_base_url.clone(),
            api_key,
            config.talent_timeout(),
        )
    }

    /// URL of the exact-match profile search, limited to one result.
    pub fn search_url(&self, identifier: &str) -> Result<Url, AppError> {
        let query = serde_json::to_string(&SearchQuery {
            identity: identifier,
            exact_match: true,
        })
        .map_err(|e| AppError::InternalError(format!("Failed to encode search query: {}", e)))?;
        let sort = serde_json::to_string(&SearchSort::default())
            .map_err(|e| AppError::InternalError(format!("Failed to encode search sort: {}", e)))?;

        self.url(
            "/search/advanced/profiles",
            &[
                ("query", query.as_str()),
                ("sort", sort.as_str()),
                ("page", "1"),
                ("per_page", "1"),
            ],
        )
    }

    pub fn score_url(&self, profile_id: &str) -> Result<Url, AppError> {
        self.url(
            "/score",
            &[("profile_id", profile_id), ("scorer_slug", BUILDER_SCORE_SLUG)],
        )
    }

    pub fn credentials_url(&self, profile_id: &str) -> Result<Url, AppError> {
        self.url("/credentials", &[("profile_id", profile_id)])
    }

    /// Searches profiles by exact identity match.
    ///
    /// Non-success statuses come back as `AppError::Upstream` carrying the
    /// upstream status so the handler can pass it through.
    pub async fn search_profiles(
        &self,
        identifier: &str,
    ) -> Result<ProfileSearchResponse, AppError> {
        let url = self.search_url(identifier)?;
        tracing::info!("Searching Talent Protocol profiles for: {}", identifier);
        self.get_json(url, "profile search").await
    }

    /// Fetches the builder score for a resolved profile id.
    pub async fn fetch_score(&self, profile_id: &str) -> Result<serde_json::Value, AppError> {
        let url = self.score_url(profile_id)?;
        tracing::info!("Fetching builder score for profile {}", profile_id);
        self.get_json(url, "score").await
    }

    /// Fetches the credentials list for a resolved profile id.
    pub async fn fetch_credentials(
        &self,
        profile_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        let url = self.credentials_url(profile_id)?;
        tracing::info!("Fetching credentials for profile {}", profile_id);
        self.get_json(url, "credentials").await
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, AppError> {
        // Build URL with proper parameter encoding; identifiers are caller-controlled
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| AppError::InternalError(format!("Failed to build URL: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, AppError> {
        tracing::debug!("Talent Protocol {} URL: {}", what, url);

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Talent {} request failed: {}", what, e))
            })?;

        let status = response.status();
        tracing::debug!("Talent Protocol {} response status: {}", what, status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                "Talent Protocol {} returned {}: {}",
                what,
                status,
                error_text
            );
            return Err(AppError::Upstream {
                status,
                message: format!(
                    "Talent Protocol API error: {}",
                    status.canonical_reason().unwrap_or("Unknown status")
                ),
            });
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Talent {} response: {}", what, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TalentClient {
        TalentClient::new(
            "https://api.talentprotocol.com/".to_string(),
            "key".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_search_url_encodes_payloads() {
        let url = client().search_url("farcaster:alice & bob").unwrap();

        assert_eq!(url.path(), "/search/advanced/profiles");
        assert_eq!(
            query_value(&url, "query").unwrap(),
            r#"{"identity":"farcaster:alice & bob","exactMatch":true}"#
        );
        assert_eq!(
            query_value(&url, "sort").unwrap(),
            r#"{"score":{"order":"desc"},"id":{"order":"desc"}}"#
        );
        assert_eq!(query_value(&url, "page").as_deref(), Some("1"));
        assert_eq!(query_value(&url, "per_page").as_deref(), Some("1"));
    }

    #[test]
    fn test_derive_urls_are_keyed_by_profile_id() {
        let url = client().score_url("p-1").unwrap();
        assert_eq!(url.path(), "/score");
        assert_eq!(query_value(&url, "profile_id").as_deref(), Some("p-1"));
        assert_eq!(
            query_value(&url, "scorer_slug").as_deref(),
            Some(BUILDER_SCORE_SLUG)
        );

        let url = client().credentials_url("p-1").unwrap();
        assert_eq!(url.path(), "/credentials");
        assert_eq!(query_value(&url, "profile_id").as_deref(), Some("p-1"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config::from_vars(|_| None).unwrap();
        assert!(matches!(
            TalentClient::from_config(&config),
            Err(AppError::Configuration(_))
        ));
    }
}
