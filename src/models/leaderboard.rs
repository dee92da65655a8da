//! Leaderboard output models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Grouping dimension of a leaderboard.
///
/// Unrecognized selectors are kept verbatim so the response echoes what the
/// caller asked for; they group by agent id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Leaders,
    Depots,
    Companies,
    Other(String),
}

impl View {
    pub fn parse(s: &str) -> Self {
        match s {
            "leaders" => View::Leaders,
            "depots" => View::Depots,
            "companies" => View::Companies,
            other => View::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            View::Leaders => "leaders",
            View::Depots => "depots",
            View::Companies => "companies",
            View::Other(s) => s,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for View {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for View {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(View::parse(&s))
    }
}

/// One ranked group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub key: String,
    pub name: String,
    pub avatar_url: String,
    /// Platoon display name; only filled for the leaders view.
    pub platoon: String,
    pub leads: f64,
    pub payins: f64,
    pub sales: f64,
    pub points: f64,
    /// 1-based position after sorting by points
    pub rank: u32,
}

/// Summary across all rows. Payins are deliberately not totalled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardMetrics {
    pub entities_count: usize,
    pub total_leads: f64,
    pub total_sales: f64,
}

impl LeaderboardMetrics {
    pub fn from_rows(rows: &[LeaderboardRow]) -> Self {
        Self {
            entities_count: rows.len(),
            total_leads: rows.iter().fold(0.0, |acc, r| acc + r.leads),
            total_sales: rows.iter().fold(0.0, |acc, r| acc + r.sales),
        }
    }
}

/// Result of one aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub view: View,
    pub metrics: LeaderboardMetrics,
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    /// Keep only the first `limit` rows. Metrics still describe the full set.
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }
}
