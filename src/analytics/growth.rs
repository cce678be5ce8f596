//! Growth rates, CAGR, and benchmark comparison scores.
//!
//! The conventions here mirror the dashboard the data feeds: a zero baseline
//! reports zero growth rather than infinity, benchmark scores clamp to
//! `[0, 200]` with `100` as the defined fallback when the benchmark itself
//! is zero, and growth rates from near-zero ratio bases or beyond the
//! configured cap are excluded from aggregate statistics while remaining
//! visible (flagged) on an individual entity's series.

use serde::Serialize;

use crate::analytics::aggregate::AggregateResult;
use crate::analytics::metric::Metric;
use crate::analytics::utility;
use crate::record::Record;

/// Year-over-year growth rate. A zero baseline reports `0.0` — flat-or-zero
/// prior periods never produce infinite growth. Callers comparing against a
/// zero baseline must remember this reads as "no growth".
pub fn yoy_growth(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous
    }
}

/// Compound annual growth rate over `years` periods.
///
/// Returns `None` when `years` is zero or either endpoint is not strictly
/// positive; a compound rate is meaningless for zero or negative values.
pub fn cagr(current: f64, base: f64, years: u32) -> Option<f64> {
    if years == 0 || !(current > 0.0) || !(base > 0.0) {
        return None;
    }
    Some((current / base).powf(1.0 / f64::from(years)) - 1.0)
}

/// Value as a percentage of the benchmark, clamped to `[0, 200]`.
///
/// A zero benchmark yields `100.0` ("at parity") rather than an error.
pub fn percent_of_benchmark(value: f64, benchmark: f64) -> f64 {
    if benchmark == 0.0 {
        return 100.0;
    }
    (value / benchmark * 100.0).clamp(0.0, 200.0)
}

/// Normalized comparison of two growth rates.
///
/// Both rates are shifted into positive territory with `(rate + 1) × 100`
/// before the ratio is taken, which avoids the sign-flip artifacts of
/// dividing negative rates directly; the result then clamps to `[0, 200]`
/// and inherits the parity fallback when the shifted benchmark is zero
/// (benchmark rate of exactly -100%).
pub fn growth_score(rate: f64, benchmark_rate: f64) -> f64 {
    percent_of_benchmark((rate + 1.0) * 100.0, (benchmark_rate + 1.0) * 100.0)
}

/// Screening thresholds for growth-rate statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierPolicy {
    /// Ratio-metric growth is not computed when the prior-period base
    /// magnitude is below this (near-zero bases explode percentages).
    pub min_base_magnitude: f64,
    /// Growth magnitudes above this are treated as data artifacts and
    /// excluded from aggregates (5.0 = 500%).
    pub max_growth_magnitude: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            min_base_magnitude: 0.01,
            max_growth_magnitude: 5.0,
        }
    }
}

impl OutlierPolicy {
    pub fn is_outlier(&self, rate: f64) -> bool {
        rate.abs() > self.max_growth_magnitude
    }

    /// Whether a prior-period value is a usable growth base. Levels always
    /// are; ratio metrics require the configured minimum magnitude.
    pub fn usable_base(&self, base: f64, ratio_metric: bool) -> bool {
        !ratio_metric || base.abs() >= self.min_base_magnitude
    }
}

/// One year-over-year step in an entity's growth series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub fiscal_year: u16,
    pub rate: f64,
    /// Set when the rate fails the outlier screen; shown but not aggregated.
    pub outlier: bool,
}

/// Year-over-year growth series for a single entity's records.
///
/// Records are sorted by fiscal year internally; a step is emitted only for
/// consecutive years (a gap in the data never compounds into one rate).
/// Screened-out rates stay in the series with `outlier` set.
pub fn growth_series(records: &[&Record], metric: Metric, policy: &OutlierPolicy) -> Vec<GrowthPoint> {
    let mut by_year: Vec<&Record> = records.to_vec();
    by_year.sort_by_key(|r| r.fiscal_year);

    by_year
        .windows(2)
        .filter(|pair| pair[1].fiscal_year == pair[0].fiscal_year + 1)
        .map(|pair| {
            let base = metric.compute(pair[0]);
            let rate = yoy_growth(metric.compute(pair[1]), base);
            GrowthPoint {
                fiscal_year: pair[1].fiscal_year,
                rate,
                outlier: policy.is_outlier(rate) || !policy.usable_base(base, metric.is_ratio()),
            }
        })
        .collect()
}

/// Mean growth rate between two fiscal years across all entities in a view.
///
/// Each entity contributes at most one rate (its `from_year` → `to_year`
/// change). Entities missing either year, with an undefined metric value,
/// with an unusable ratio base, or whose rate trips the outlier cap are
/// excluded; `count` reports how many rates were actually averaged.
pub fn mean_growth(
    records: &[&Record],
    metric: Metric,
    from_year: u16,
    to_year: u16,
    policy: &OutlierPolicy,
) -> AggregateResult {
    let mut rates = Vec::new();

    for r in records {
        if r.fiscal_year != from_year {
            continue;
        }
        let Some(base) = metric.compute_checked(r) else {
            continue;
        };
        let Some(current) = records
            .iter()
            .find(|c| c.loc_id == r.loc_id && c.fiscal_year == to_year)
            .and_then(|c| metric.compute_checked(c))
        else {
            continue;
        };

        if !policy.usable_base(base, metric.is_ratio()) {
            continue;
        }
        let rate = yoy_growth(current, base);
        if policy.is_outlier(rate) {
            continue;
        }
        rates.push(rate);
    }

    AggregateResult {
        count: rates.len(),
        value: utility::mean(&rates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn test_yoy_growth_basic() {
        assert_close(yoy_growth(110.0, 100.0), 0.10);
        assert_close(yoy_growth(90.0, 100.0), -0.10);
    }

    #[test]
    fn test_yoy_growth_zero_baseline() {
        assert_eq!(yoy_growth(50.0, 0.0), 0.0);
        assert_eq!(yoy_growth(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_cagr_formula() {
        // (192/100)^(1/3) - 1
        let rate = cagr(192.0, 100.0, 3).unwrap();
        assert_close(rate, 1.92_f64.powf(1.0 / 3.0) - 1.0);
        assert!((rate - 0.24298).abs() < 1e-4);
    }

    #[test]
    fn test_cagr_undefined_cases() {
        assert_eq!(cagr(100.0, 0.0, 3), None);
        assert_eq!(cagr(0.0, 100.0, 3), None);
        assert_eq!(cagr(-5.0, 100.0, 3), None);
        assert_eq!(cagr(100.0, 50.0, 0), None);
    }

    #[test]
    fn test_percent_of_benchmark() {
        assert_eq!(percent_of_benchmark(150.0, 100.0), 150.0);
        assert_eq!(percent_of_benchmark(500.0, 100.0), 200.0); // clamped
        assert_eq!(percent_of_benchmark(50.0, 0.0), 100.0); // parity fallback
        assert_eq!(percent_of_benchmark(-20.0, 100.0), 0.0); // clamped low
    }

    #[test]
    fn test_growth_score_avoids_sign_flip() {
        // -10% vs -20%: shifted ratio 90/80 -> 112.5, correctly above parity.
        // A naive ratio of the raw rates would read 50.
        assert_close(growth_score(-0.10, -0.20), 112.5);
        assert_eq!(growth_score(0.05, 0.05), 100.0);
    }

    #[test]
    fn test_growth_score_clamps_and_falls_back() {
        assert_eq!(growth_score(4.0, 0.0), 200.0);
        // benchmark rate of -100% shifts to zero: parity fallback
        assert_eq!(growth_score(0.10, -1.0), 100.0);
    }

    #[test]
    fn test_outlier_policy_defaults() {
        let policy = OutlierPolicy::default();
        assert!(policy.is_outlier(8.0)); // 800% > 500% cap
        assert!(!policy.is_outlier(5.0));
        assert!(policy.usable_base(0.005, false)); // levels always usable
        assert!(!policy.usable_base(0.005, true));
        assert!(policy.usable_base(-0.02, true)); // magnitude, not sign
    }

    fn year_record(loc_id: &str, year: u16, enplanements: f64) -> Record {
        Record {
            loc_id: loc_id.into(),
            fiscal_year: year,
            enplanements,
            ..Record::default()
        }
    }

    #[test]
    fn test_growth_series_consecutive_years_only() {
        let records = vec![
            year_record("AAA", 2020, 100.0),
            year_record("AAA", 2021, 110.0),
            // 2022 missing
            year_record("AAA", 2023, 121.0),
        ];
        let v: Vec<&Record> = records.iter().collect();

        let series = growth_series(&v, Metric::Enplanements, &OutlierPolicy::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].fiscal_year, 2021);
        assert_close(series[0].rate, 0.10);
    }

    #[test]
    fn test_growth_series_flags_outliers_but_keeps_them() {
        let records = vec![
            year_record("AAA", 2021, 10.0),
            year_record("AAA", 2022, 90.0), // +800%
            year_record("AAA", 2023, 99.0), // +10%
        ];
        let v: Vec<&Record> = records.iter().collect();

        let series = growth_series(&v, Metric::Enplanements, &OutlierPolicy::default());
        assert_eq!(series.len(), 2);
        assert!(series[0].outlier);
        assert_close(series[0].rate, 8.0);
        assert!(!series[1].outlier);
    }

    #[test]
    fn test_mean_growth_excludes_outliers() {
        // AAA grows 800% (excluded by the 500% cap), BBB grows 10%.
        let records = vec![
            year_record("AAA", 2021, 10.0),
            year_record("AAA", 2022, 90.0),
            year_record("BBB", 2021, 100.0),
            year_record("BBB", 2022, 110.0),
        ];
        let v: Vec<&Record> = records.iter().collect();

        let result = mean_growth(&v, Metric::Enplanements, 2021, 2022, &OutlierPolicy::default());
        assert_eq!(result.count, 1);
        assert_close(result.value, 0.10);
    }

    fn margin_record(loc_id: &str, year: u16, expense: f64) -> Record {
        Record {
            loc_id: loc_id.into(),
            fiscal_year: year,
            total_operating_revenue: 1000.0,
            total_operating_expense: expense,
            ..Record::default()
        }
    }

    #[test]
    fn test_mean_growth_screens_tiny_ratio_bases() {
        // AAA's 2021 margin is 0.001, below the 0.01 base threshold, so it
        // contributes no rate. BBB's margin goes 0.20 -> 0.22 (+10%).
        let records = vec![
            margin_record("AAA", 2021, 999.0),
            margin_record("AAA", 2022, 900.0),
            margin_record("BBB", 2021, 800.0),
            margin_record("BBB", 2022, 780.0),
        ];
        let v: Vec<&Record> = records.iter().collect();

        let result = mean_growth(&v, Metric::OperatingMargin, 2021, 2022, &OutlierPolicy::default());
        assert_eq!(result.count, 1);
        assert_close(result.value, 0.10);
    }

    #[test]
    fn test_mean_growth_requires_both_years() {
        let records = vec![year_record("AAA", 2021, 100.0)];
        let v: Vec<&Record> = records.iter().collect();
        let result = mean_growth(&v, Metric::Enplanements, 2021, 2022, &OutlierPolicy::default());
        assert_eq!(result.count, 0);
        assert_eq!(result.value, 0.0);
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}
