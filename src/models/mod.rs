//! Core data models for the leaderboard service.

mod ids;
mod leaderboard;
mod range;
mod records;

pub use ids::*;
pub use leaderboard::*;
pub use range::*;
pub use records::*;
