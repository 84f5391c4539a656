//! Descriptive statistics for numeric columns.

/// `describe()`-style summary of a numeric series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); NaN for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Option<Summary> {
        let sorted = sorted_finite(values);
        if sorted.is_empty() {
            return None;
        }
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };
        Some(Summary {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}

/// Box-and-whisker geometry with Tukey 1.5 × IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn of(values: &[f64]) -> Option<BoxStats> {
        let sorted = sorted_finite(values);
        if sorted.is_empty() {
            return None;
        }
        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let inside = || sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let whisker_low = inside().next().unwrap_or(q1);
        let whisker_high = inside().last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxStats {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Quantile `q` in `[0, 1]` of an ascending slice, interpolating linearly
/// between the closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Gaussian kernel density of `values` evaluated at each point of `grid`,
/// using Scott's rule for the bandwidth.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return vec![0.0; grid.len()];
    }
    let sd = Summary::of(values).map(|s| s.std).unwrap_or(f64::NAN);
    let mut bw = (n as f64).powf(-0.2) * sd;
    if !bw.is_finite() || bw <= 0.0 {
        bw = 1.0;
    }
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());
    grid.iter()
        .map(|&g| {
            values
                .iter()
                .map(|&v| (-0.5 * ((g - v) / bw).powi(2)).exp())
                .sum::<f64>()
                * norm
        })
        .collect()
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_matches_pandas_describe() {
        let s = Summary::of(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.count, 4);
        assert!(close(s.mean, 2.5));
        assert!(close(s.std, 1.2909944487358056));
        assert!(close(s.q25, 1.75));
        assert!(close(s.median, 2.5));
        assert!(close(s.q75, 3.25));
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }

    #[test]
    fn summary_of_single_value_has_nan_std() {
        let s = Summary::of(&[7.0]).unwrap();
        assert!(s.std.is_nan());
        assert_eq!(s.median, 7.0);
        assert!(Summary::of(&[]).is_none());
    }

    #[test]
    fn box_stats_flags_outliers() {
        let b = BoxStats::of(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 5.0);
        assert!(b.q1 <= b.median && b.median <= b.q3);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 7.0];
        let step = 0.01;
        let grid: Vec<f64> = (0..2000).map(|i| -5.0 + i as f64 * step).collect();
        let area: f64 = gaussian_kde(&values, &grid).iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 1e-3, "area = {area}");
    }

    #[test]
    fn kde_handles_constant_input() {
        let d = gaussian_kde(&[3.0, 3.0], &[3.0]);
        assert!(d[0].is_finite() && d[0] > 0.0);
    }
}
