//! Scalar statistics over `f64` slices.
//!
//! Empty input always yields `0.0` rather than an error; callers that must
//! distinguish "no data" from a zero value carry a separate count.

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Median of the values, order-independent. Even counts average the two
/// middle elements; empty input returns 0.0.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Value at percentile `p` of an ascending-sorted slice.
///
/// `p` is clamped to `[0, 100]`; the index convention is
/// `floor(len * p / 100)` clamped to the last element. Empty input → 0.0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 100.0);
    let idx = ((sorted.len() as f64 * p / 100.0).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[4.0, 6.0]), 5.0);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[10.0, 20.0, 30.0, 40.0]), 25.0);
    }

    #[test]
    fn test_median_odd_count_order_independent() {
        assert_eq!(median(&[5.0, 1.0, 9.0]), 5.0);
        assert_eq!(median(&[9.0, 5.0, 1.0]), 5.0);
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&[1.0, 2.0, 3.5]), 6.5);
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(max(&[3.0, -1.0, 2.0]), 3.0);
        assert_eq!(min(&[]), 0.0);
        assert_eq!(max(&[]), 0.0);
    }

    #[test]
    fn test_stddev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert!((stddev(&values, m) - 2.0).abs() < 1e-12);
        assert_eq!(stddev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_percentile_floor_index() {
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        // floor(100 * 50 / 100) = 50 -> value 51
        assert_eq!(percentile(&sorted, 50.0), 51.0);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        // p = 100 indexes past the end and clamps to the last element
        assert_eq!(percentile(&sorted, 100.0), 100.0);
    }

    #[test]
    fn test_percentile_clamps_out_of_range_p() {
        let sorted = [1.0, 2.0, 3.0];
        assert_eq!(percentile(&sorted, -10.0), percentile(&sorted, 0.0));
        assert_eq!(percentile(&sorted, 250.0), percentile(&sorted, 100.0));
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
