//! Aggregation over filtered record views.
//!
//! All functions take a borrowed view (`&[&Record]`) produced by the filter
//! pipeline, extract the checked metric values, and reduce them. Records for
//! which the metric is undefined (zero denominator) are excluded from the
//! reduction, not counted as zeros; the `count` on every result reflects the
//! values actually used.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analytics::metric::Metric;
use crate::analytics::utility;
use crate::record::Record;

/// Reduction applied to the usable metric values of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Mean,
    Median,
    Sum,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Sum => "sum",
        }
    }

    fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Mean => utility::mean(values),
            Aggregation::Median => utility::median(values),
            Aggregation::Sum => utility::sum(values),
        }
    }
}

impl FromStr for Aggregation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mean" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            "sum" => Ok(Aggregation::Sum),
            other => Err(anyhow::anyhow!(
                "unknown aggregation '{other}' (expected mean, median, or sum)"
            )),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reduced value together with the number of records it was computed from.
/// `count == 0` means "no data" even though `value` reads `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateResult {
    pub count: usize,
    pub value: f64,
}

/// Checked metric values of a view, in view order. Undefined records are
/// skipped.
pub fn metric_values(records: &[&Record], metric: Metric) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| metric.compute_checked(r))
        .collect()
}

/// Reduces one metric over a view.
pub fn aggregate(records: &[&Record], metric: Metric, kind: Aggregation) -> AggregateResult {
    let values = metric_values(records, metric);
    AggregateResult {
        count: values.len(),
        value: kind.apply(&values),
    }
}

/// Partitioning key for grouped aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    FiscalYear,
    HubSize,
    State,
}

impl GroupBy {
    pub fn key(&self, r: &Record) -> String {
        match self {
            GroupBy::FiscalYear => r.fiscal_year.to_string(),
            GroupBy::HubSize => r.hub_size.to_string(),
            GroupBy::State => r.state.clone(),
        }
    }
}

impl FromStr for GroupBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "year" | "fiscal_year" => Ok(GroupBy::FiscalYear),
            "hub" | "hub_size" => Ok(GroupBy::HubSize),
            "state" => Ok(GroupBy::State),
            other => Err(anyhow::anyhow!(
                "unknown grouping '{other}' (expected year, hub, or state)"
            )),
        }
    }
}

/// Buckets the view by `group` and reduces each bucket independently.
///
/// Buckets whose usable count is zero are omitted from the output entirely
/// (a group of records whose metric is undefined everywhere does not appear
/// as a zero row). Keys sort naturally via the `BTreeMap`.
pub fn group_aggregate(
    records: &[&Record],
    group: GroupBy,
    metric: Metric,
    kind: Aggregation,
) -> BTreeMap<String, AggregateResult> {
    let mut buckets: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for r in records {
        buckets.entry(group.key(r)).or_default().push(r);
    }

    buckets
        .into_iter()
        .filter_map(|(key, bucket)| {
            let result = aggregate(&bucket, metric, kind);
            (result.count > 0).then_some((key, result))
        })
        .collect()
}

/// Full descriptive summary of one metric over a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

pub fn summarize(records: &[&Record], metric: Metric) -> Summary {
    let values = metric_values(records, metric);
    let mean = utility::mean(&values);
    Summary {
        count: values.len(),
        mean,
        median: utility::median(&values),
        min: utility::min(&values),
        max: utility::max(&values),
        stddev: utility::stddev(&values, mean),
    }
}

/// Percentile reference lines splitting a scatter plot into quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadrantLines {
    pub x: f64,
    pub y: f64,
}

/// The p-th percentile of each axis metric over the same view, or `None`
/// when either metric has no usable values.
pub fn quadrant_lines(
    records: &[&Record],
    x_metric: Metric,
    y_metric: Metric,
    p: f64,
) -> Option<QuadrantLines> {
    let mut xs = metric_values(records, x_metric);
    let mut ys = metric_values(records, y_metric);
    if xs.is_empty() || ys.is_empty() {
        return None;
    }
    xs.sort_by(f64::total_cmp);
    ys.sort_by(f64::total_cmp);
    Some(QuadrantLines {
        x: utility::percentile(&xs, p),
        y: utility::percentile(&ys, p),
    })
}
