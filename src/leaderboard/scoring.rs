//! Points formula and ranking.

use crate::models::LeaderboardRow;

/// Per-unit weight of each metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub leads: f64,
    pub payins: f64,
    pub sales: f64,
}

/// Fixed business weighting: a lead is 1 point, a payin 2, and every 1000 in
/// sales 1.5.
pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    leads: 1.0,
    payins: 2.0,
    sales: 1.5 / 1000.0,
};

impl ScoreWeights {
    pub fn points(&self, leads: f64, payins: f64, sales: f64) -> f64 {
        leads * self.leads + payins * self.payins + sales * self.sales
    }
}

/// Points for accumulated totals under the fixed weighting.
pub fn compute_points(leads: f64, payins: f64, sales: f64) -> f64 {
    SCORE_WEIGHTS.points(leads, payins, sales)
}

/// Score every row, sort by points descending and assign 1-based ranks.
///
/// The sort is stable, so rows with equal points keep their incoming order.
pub fn rank_rows(rows: &mut [LeaderboardRow]) {
    for row in rows.iter_mut() {
        row.points = compute_points(row.leads, row.payins, row.sales);
    }

    rows.sort_by(|a, b| b.points.total_cmp(&a.points));

    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx as u32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, leads: f64, payins: f64, sales: f64) -> LeaderboardRow {
        LeaderboardRow {
            key: key.to_string(),
            name: key.to_string(),
            avatar_url: String::new(),
            platoon: String::new(),
            leads,
            payins,
            sales,
            points: 0.0,
            rank: 0,
        }
    }

    #[test]
    fn test_compute_points() {
        let points = compute_points(10.0, 5.0, 2000.0);
        assert!((points - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_points_zero() {
        assert_eq!(compute_points(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_sales_weight() {
        assert!((compute_points(0.0, 0.0, 1000.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rank_rows_descending() {
        let mut rows = vec![
            row("low", 1.0, 0.0, 0.0),
            row("high", 0.0, 5.0, 0.0),
            row("mid", 3.0, 0.0, 0.0),
        ];
        rank_rows(&mut rows);

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["high", "mid", "low"]);
        assert_eq!(
            rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(rows[0].points, 10.0);
    }

    #[test]
    fn test_rank_rows_ties_keep_order() {
        let mut rows = vec![
            row("first", 2.0, 0.0, 0.0),
            row("second", 0.0, 1.0, 0.0),
            row("top", 9.0, 0.0, 0.0),
        ];
        rank_rows(&mut rows);

        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["top", "first", "second"]);
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[2].rank, 3);
    }

    #[test]
    fn test_rank_rows_empty() {
        let mut rows: Vec<LeaderboardRow> = Vec::new();
        rank_rows(&mut rows);
        assert!(rows.is_empty());
    }
}
