use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::IntoParams;

pub const MISSING_IDENTIFIER_MESSAGE: &str = "Identifier parameter is required";
pub const PROFILE_NOT_FOUND_MESSAGE: &str = "Profile not found";

/// Raw query parameters accepted by `GET /api/talent-protocol`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookupParams {
    /// Wallet address, ENS name or platform-qualified username (e.g. `farcaster:alice`).
    pub identifier: Option<String>,
    /// `profile` (default), `score` or `credentials`. Unknown values fall back to `profile`.
    pub action: Option<String>,
}

impl LookupParams {
    /// Builds params from raw query pairs. The first occurrence of a key wins,
    /// so a repeated `identifier` or `action` never discards the whole query.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "identifier" if params.identifier.is_none() => params.identifier = Some(value),
                "action" if params.action.is_none() => params.action = Some(value),
                _ => {}
            }
        }
        params
    }
}

/// Which resource the caller wants for the resolved profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupAction {
    #[default]
    Profile,
    Score,
    Credentials,
}

impl LookupAction {
    /// Maps the raw `action` parameter; anything unrecognised is `Profile`.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("score") => LookupAction::Score,
            Some("credentials") => LookupAction::Credentials,
            _ => LookupAction::Profile,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupAction::Profile => "profile",
            LookupAction::Score => "score",
            LookupAction::Credentials => "credentials",
        }
    }

    /// True when the action needs a follow-up call after resolution.
    pub fn needs_derive(&self) -> bool {
        !matches!(self, LookupAction::Profile)
    }
}

impl fmt::Display for LookupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated lookup, built once per inbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub identifier: String,
    pub action: LookupAction,
}

impl LookupRequest {
    pub fn new(identifier: impl Into<String>, action: LookupAction) -> Self {
        Self {
            identifier: identifier.into(),
            action,
        }
    }

    /// Validates raw query parameters. A missing or blank identifier is a client error.
    pub fn from_params(params: LookupParams) -> Result<Self, AppError> {
        let identifier = params
            .identifier
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest(MISSING_IDENTIFIER_MESSAGE.to_string()))?;

        Ok(Self {
            identifier,
            action: LookupAction::from_param(params.action.as_deref()),
        })
    }
}

/// Body of `GET /search/advanced/profiles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSearchResponse {
    /// Missing and `null` both mean no match.
    #[serde(default)]
    pub profiles: Option<Vec<Value>>,
}

impl ProfileSearchResponse {
    /// First (best ranked) result, if any.
    pub fn into_first(self) -> Option<ResolvedProfile> {
        self.profiles
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(ResolvedProfile::from_search_result)
    }
}

/// Search payload sent as the `query` parameter.
#[derive(Debug, Serialize)]
pub struct SearchQuery<'a> {
    pub identity: &'a str,
    #[serde(rename = "exactMatch")]
    pub exact_match: bool,
}

#[derive(Debug, Serialize)]
pub struct SortOrder {
    pub order: &'static str,
}

/// Sort payload sent as the `sort` parameter. Field order matters: relevance
/// score first, then id as the tie-break.
#[derive(Debug, Serialize)]
pub struct SearchSort {
    pub score: SortOrder,
    pub id: SortOrder,
}

impl Default for SearchSort {
    fn default() -> Self {
        Self {
            score: SortOrder { order: "desc" },
            id: SortOrder { order: "desc" },
        }
    }
}

/// The profile picked by the exact-match search.
///
/// `raw` is returned to the caller untouched; `profile_id` keys the derive step.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub profile_id: Option<String>,
    pub raw: Value,
}

impl ResolvedProfile {
    pub fn from_search_result(raw: Value) -> Self {
        let profile_id = ["id", "profile_id"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(id_as_string));

        Self { profile_id, raw }
    }
}

fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
