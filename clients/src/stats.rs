//! Move-count summaries.

use core::fmt;

use serde::Serialize;

/// Summary of a batch of games.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    /// Games played.
    pub runs: usize,
    /// Games that ended dark.
    pub solved: usize,
    /// Mean move count.
    pub mean: f64,
    /// Median move count.
    pub median: f64,
    /// 10th percentile.
    pub p10: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
}

impl Summary {
    /// Summarises move counts; `None` when there are none.
    #[must_use]
    pub fn from_moves(moves: &[usize], solved: usize) -> Option<Self> {
        if moves.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = moves.iter().map(|&m| m as f64).collect();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            runs: moves.len(),
            solved,
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            median: percentile(&sorted, 50.0),
            p10: percentile(&sorted, 10.0),
            p25: percentile(&sorted, 25.0),
            p75: percentile(&sorted, 75.0),
            p90: percentile(&sorted, 90.0),
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mean: {}, Median: {} moves, P10: {}, P25: {}, P75: {}, P90: {}",
            self.mean, self.median, self.p10, self.p25, self.p75, self.p90
        )
    }
}

/// Linear interpolation between closest ranks of an ascending, non-empty
/// slice.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return f64::NAN;
    };
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    match (sorted.get(lo), sorted.get(hi)) {
        (Some(&a), Some(&b)) => a + (b - a) * (rank - lo as f64),
        _ => last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&v, 10.0) - 1.3).abs() < 1e-12);
        assert!((percentile(&v, 90.0) - 3.7).abs() < 1e-12);
        assert!((percentile(&v, 100.0) - 4.0).abs() < 1e-12);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_summary() {
        let s = Summary::from_moves(&[7, 3, 5, 9, 1], 5).unwrap();
        assert_eq!(s.runs, 5);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.median - 5.0).abs() < 1e-12);
        assert!((s.p25 - 3.0).abs() < 1e-12);
        assert!((s.p90 - 8.2).abs() < 1e-12);
        assert!(s.to_string().starts_with("Mean: 5, Median: 5 moves"));
        assert!(Summary::from_moves(&[], 0).is_none());
    }

    #[test]
    fn test_json() {
        let s = Summary::from_moves(&[2, 4], 2).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["runs"], 2);
        assert_eq!(json["median"], 3.0);
    }
}
