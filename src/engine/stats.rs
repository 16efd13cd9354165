use serde::{Deserialize, Serialize};

use super::aggregate::{group_values, GroupKey, Target};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Order statistics
// ---------------------------------------------------------------------------

/// Median of `values`, sorting them in place. `None` when empty.
pub fn median(values: &mut [f64]) -> Option<f64> {
    values.sort_by(f64::total_cmp);
    quantile_sorted(values, 0.5)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile `q` (0..=1) of an ascending slice, interpolating linearly between
/// the two closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

// ---------------------------------------------------------------------------
// Box-plot summary
// ---------------------------------------------------------------------------

/// Five-number summary of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    pub fn from_values(values: &mut [f64]) -> Option<Self> {
        values.sort_by(f64::total_cmp);
        Some(BoxSummary {
            count: values.len(),
            min: *values.first()?,
            q1: quantile_sorted(values, 0.25)?,
            median: quantile_sorted(values, 0.5)?,
            q3: quantile_sorted(values, 0.75)?,
            max: *values.last()?,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// One [`BoxSummary`] per group, groups in first-appearance order.
pub fn box_summaries(table: &Table, key: GroupKey, target: Target) -> Vec<(u8, BoxSummary)> {
    group_values(table, key, target)
        .into_iter()
        .filter_map(|(k, mut values)| Some((k, BoxSummary::from_values(&mut values)?)))
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter + regression line
// ---------------------------------------------------------------------------

/// `[x, y]` pairs in row order; rows missing either field are skipped.
pub fn scatter_points(table: &Table, x: Target, y: Target) -> Vec<[f64; 2]> {
    table
        .iter()
        .filter_map(|r| Some([x.value(r)?, y.value(r)?]))
        .collect()
}

/// Ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation; 0 when `y` is constant.
    pub r: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through `points`. `None` for fewer than two points or when all
/// `x` are equal.
pub fn linear_fit(points: &[[f64; 2]]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for [x, y] in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let r = if syy == 0.0 {
        0.0
    } else {
        sxy / (sxx * syy).sqrt()
    };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r,
        n: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(median(&mut [40.0, 10.0, 30.0, 20.0]), Some(25.0));
        assert_eq!(median(&mut [25.0, 5.0, 15.0]), Some(15.0));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn quartiles_interpolate() {
        let mut v = [1.0, 2.0, 3.0, 4.0];
        let summary = BoxSummary::from_values(&mut v).unwrap();
        assert!(close(summary.q1, 1.75));
        assert!(close(summary.median, 2.5));
        assert!(close(summary.q3, 3.25));
        assert!(close(summary.iqr(), 1.5));
        assert_eq!((summary.min, summary.max, summary.count), (1.0, 4.0, 4));
    }

    #[test]
    fn exact_line_is_recovered() {
        let points = [[0.0, 1.0], [1.0, 3.0], [2.0, 5.0]];
        let fit = linear_fit(&points).unwrap();
        assert!(close(fit.slope, 2.0));
        assert!(close(fit.intercept, 1.0));
        assert!(close(fit.r, 1.0));
        assert!(close(fit.predict(3.0), 7.0));
    }

    #[test]
    fn degenerate_fits() {
        assert!(linear_fit(&[[1.0, 2.0]]).is_none());
        assert!(linear_fit(&[[1.0, 2.0], [1.0, 5.0]]).is_none());
        let flat = linear_fit(&[[0.0, 2.0], [1.0, 2.0]]).unwrap();
        assert_eq!((flat.slope, flat.r), (0.0, 0.0));
    }
}
