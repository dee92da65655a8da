//! Leaderboard engine.
//!
//! Turns raw performance records into ranked groups:
//! - **resolver**: map a record's `agentId` to agent metadata
//! - **view**: grouping key and display rules per view
//! - **scoring**: points formula and ranking
//! - **aggregator**: concurrent fetch and single-pass accumulation

pub mod aggregator;
pub mod resolver;
pub mod scoring;
pub mod view;

use thiserror::Error;

use crate::store::StoreError;

pub use aggregator::{build_leaderboard, LeaderboardAggregator};
pub use resolver::{AgentDirectory, AgentResolution};
pub use scoring::{compute_points, rank_rows, ScoreWeights, SCORE_WEIGHTS};
pub use view::{GroupDisplay, GroupingStrategy, ReferenceLookups};

/// Errors that abort an aggregation.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LeaderboardError {
    /// Whether the failure is a missing configuration rather than a failed read.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, LeaderboardError::Store(StoreError::NotConfigured(_)))
    }
}
