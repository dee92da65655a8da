//! Scoring-formula lookup.
//!
//! Thin client for the `get_active_scoring_formula` remote procedure exposed
//! through a PostgREST-style RPC endpoint (`/rest/v1/rpc/<name>`). The
//! procedure's own error payload is returned to the caller alongside `data`
//! rather than raised; only a missing configuration or a transport failure
//! is an `Err`.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::FormulaConfig;

pub const ACTIVE_FORMULA_PROCEDURE: &str = "get_active_scoring_formula";

#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("Scoring formula service is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid formula service URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Error payload reported by the remote procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// `{ data, error }` pair, exactly one of which is normally set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaResponse {
    pub data: Option<Value>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone)]
struct Endpoint {
    rpc_url: Url,
    anon_key: String,
}

/// Client for the active scoring formula.
pub struct ScoringFormulaClient {
    client: Client,
    endpoint: Option<Endpoint>,
}

impl ScoringFormulaClient {
    /// A missing URL or key is not an error here; calls fail with
    /// [`FormulaError::NotConfigured`] instead.
    pub fn new(config: &FormulaConfig) -> Result<Self, FormulaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let url = config.url.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let key = config
            .anon_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let endpoint = match (url, key) {
            (Some(url), Some(key)) => Some(Endpoint {
                rpc_url: rpc_endpoint(url, ACTIVE_FORMULA_PROCEDURE)?,
                anon_key: key.to_string(),
            }),
            _ => None,
        };

        Ok(Self { client, endpoint })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Call the procedure for a battle type and week.
    pub async fn get_active_formula(
        &self,
        battle_type: &str,
        week_key: &str,
    ) -> Result<FormulaResponse, FormulaError> {
        let endpoint = self.endpoint.as_ref().ok_or_else(|| {
            FormulaError::NotConfigured(
                "set formula.url and formula.anon_key (or SUPABASE_URL and SUPABASE_ANON_KEY)"
                    .to_string(),
            )
        })?;

        debug!(
            "Calling {} for battle_type={} week_key={}",
            ACTIVE_FORMULA_PROCEDURE, battle_type, week_key
        );

        let response = self
            .client
            .post(endpoint.rpc_url.clone())
            .header("apikey", &endpoint.anon_key)
            .bearer_auth(&endpoint.anon_key)
            .json(&json!({ "battle_type": battle_type, "week_key": week_key }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("{} returned {}", ACTIVE_FORMULA_PROCEDURE, status);
            return Ok(FormulaResponse {
                data: None,
                error: Some(parse_rpc_error(status.as_u16(), &body)),
            });
        }

        Ok(parse_rpc_success(&body))
    }
}

/// `<base>/rest/v1/rpc/<procedure>`, keeping any path prefix on the base.
fn rpc_endpoint(base: &str, procedure: &str) -> Result<Url, FormulaError> {
    let mut base = base.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    Url::parse(&base)
        .and_then(|u| u.join(&format!("rest/v1/rpc/{}", procedure)))
        .map_err(|e| FormulaError::InvalidUrl(format!("{}: {}", base, e)))
}

fn parse_rpc_success(body: &str) -> FormulaResponse {
    if body.trim().is_empty() {
        return FormulaResponse::default();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(data) => FormulaResponse {
            data: Some(data),
            error: None,
        },
        Err(e) => FormulaResponse {
            data: None,
            error: Some(RpcError {
                message: format!("Unparseable response: {}", e),
                code: None,
                details: None,
                hint: None,
            }),
        },
    }
}

fn parse_rpc_error(status: u16, body: &str) -> RpcError {
    serde_json::from_str::<RpcError>(body).unwrap_or_else(|_| RpcError {
        message: if body.trim().is_empty() {
            format!("HTTP {}", status)
        } else {
            body.trim().to_string()
        },
        code: Some(status.to_string()),
        details: None,
        hint: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(url: Option<&str>, key: Option<&str>) -> FormulaConfig {
        FormulaConfig {
            url: url.map(str::to_string),
            anon_key: key.map(str::to_string),
            ..FormulaConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unconfigured_fails_fast() {
        let client = ScoringFormulaClient::new(&config(None, Some("anon"))).unwrap();
        assert!(!client.is_configured());

        let result = client.get_active_formula("platoon", "2026-W07").await;
        assert!(matches!(result, Err(FormulaError::NotConfigured(_))));
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let client =
            ScoringFormulaClient::new(&config(Some("https://xyz.supabase.co"), Some(" "))).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_configured() {
        let client =
            ScoringFormulaClient::new(&config(Some("https://xyz.supabase.co"), Some("anon")))
                .unwrap();
        assert!(client.is_configured());
    }

    #[test]
    fn test_invalid_url() {
        let result = ScoringFormulaClient::new(&config(Some("not a url"), Some("anon")));
        assert!(matches!(result, Err(FormulaError::InvalidUrl(_))));
    }

    #[test]
    fn test_rpc_endpoint() {
        assert_eq!(
            rpc_endpoint("https://xyz.supabase.co", ACTIVE_FORMULA_PROCEDURE)
                .unwrap()
                .as_str(),
            "https://xyz.supabase.co/rest/v1/rpc/get_active_scoring_formula"
        );
        assert_eq!(
            rpc_endpoint("http://localhost:54321/proxy", "f").unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/rpc/f"
        );
    }

    #[test]
    fn test_parse_success() {
        let response = parse_rpc_success(r#"[{"leads":1,"payins":2}]"#);
        assert_eq!(
            response.data,
            Some(serde_json::json!([{ "leads": 1, "payins": 2 }]))
        );
        assert!(response.error.is_none());

        assert_eq!(parse_rpc_success(""), FormulaResponse::default());
        assert!(parse_rpc_success("<html>").error.is_some());
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_rpc_error(
            404,
            r#"{"message":"function not found","code":"PGRST202","details":null,"hint":"check name"}"#,
        );
        assert_eq!(err.message, "function not found");
        assert_eq!(err.code.as_deref(), Some("PGRST202"));
        assert_eq!(err.hint.as_deref(), Some("check name"));

        let plain = parse_rpc_error(502, "");
        assert_eq!(plain.message, "HTTP 502");
        assert_eq!(plain.code.as_deref(), Some("502"));
    }
}
