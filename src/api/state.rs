use std::sync::Arc;

use crate::formula::ScoringFormulaClient;
use crate::leaderboard::LeaderboardAggregator;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<LeaderboardAggregator>,
    pub formulas: Arc<ScoringFormulaClient>,
    pub cors_origin: String,
}
