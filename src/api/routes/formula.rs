use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::formula::FormulaResponse;

#[derive(Debug, Deserialize)]
pub struct FormulaParams {
    pub battle_type: Option<String>,
    pub week_key: Option<String>,
}

pub async fn get_active_formula(
    State(state): State<AppState>,
    params: Result<Query<FormulaParams>, QueryRejection>,
) -> Result<Json<FormulaResponse>, ApiError> {
    let Query(params) = params?;
    let battle_type = required(params.battle_type, "battle_type")?;
    let week_key = required(params.week_key, "week_key")?;

    let response = state
        .formulas
        .get_active_formula(&battle_type, &week_key)
        .await?;

    Ok(Json(response))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing query parameter: {}", name)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::config::FormulaConfig;
    use crate::formula::ScoringFormulaClient;
    use crate::leaderboard::LeaderboardAggregator;
    use crate::store::JsonlStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn unconfigured_state(dir: &std::path::Path) -> AppState {
        AppState {
            aggregator: Arc::new(LeaderboardAggregator::new(Arc::new(JsonlStore::new(
                dir.to_path_buf(),
            )))),
            formulas: Arc::new(ScoringFormulaClient::new(&FormulaConfig::default()).unwrap()),
            cors_origin: "*".to_string(),
        }
    }

    #[tokio::test]
    async fn test_formula_not_configured() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(unconfigured_state(tmp.path()));

        let (status, json) = get_json(
            app,
            "/api/scoring-formula?battle_type=platoon&week_key=2026-W07",
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_formula_missing_params() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(unconfigured_state(tmp.path()));

        let (status, json) = get_json(app.clone(), "/api/scoring-formula?battle_type=platoon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("week_key"));

        let (status, _) = get_json(app, "/api/scoring-formula?battle_type=&week_key=2026-W07").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
