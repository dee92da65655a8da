pub mod formula;
pub mod health;
pub mod leaderboard;
