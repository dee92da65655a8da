//! # Platoon Board
//!
//! Leaderboards for agent performance: leads, payins and sales aggregated
//! per agent, depot or company and ranked by a fixed points formula.
//!
//! ## Architecture
//!
//! - **models**: Records, reference entities, date ranges and leaderboard rows
//! - **store**: Record store read interface (Firestore REST, JSONL files)
//! - **leaderboard**: Agent resolution, grouping, scoring and ranking
//! - **formula**: Active scoring formula lookup (remote procedure)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod config;
pub mod formula;
pub mod leaderboard;
pub mod models;
pub mod store;

pub use models::*;
