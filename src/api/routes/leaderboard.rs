use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{resolve_range, Leaderboard, View};

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// `leaders` (default), `depots` or `companies`
    pub view: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// ISO week key, e.g. `2026-W07`
    pub week: Option<String>,
    pub limit: Option<usize>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<Leaderboard>, ApiError> {
    let Query(params) = params?;
    let view = params
        .view
        .as_deref()
        .map(View::parse)
        .unwrap_or_default();
    let range = resolve_range(
        params.week.as_deref(),
        params.start.as_deref(),
        params.end.as_deref(),
    )?;

    let mut board = state.aggregator.aggregate(range.as_ref(), view).await?;
    if let Some(limit) = params.limit {
        board.truncate(limit);
    }

    Ok(Json(board))
}
