//! Chart-ready report structures.
//!
//! Each builder here assembles the plain data one dashboard view consumes:
//! grouped summary tables, radar-chart benchmark scores, per-airport trend
//! series, metric distributions with annotated markers, scatter points with
//! quadrant reference lines, and ranking tables. Builders take a filtered
//! view plus explicit parameters and return serializable structs; nothing is
//! cached and nothing mutates the view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::aggregate::{
    Aggregation, GroupBy, QuadrantLines, aggregate, group_aggregate, quadrant_lines,
};
use crate::analytics::bins::{Annotation, Histogram, Marker, annotate};
use crate::analytics::growth::{
    GrowthPoint, OutlierPolicy, cagr, growth_score, growth_series, mean_growth,
    percent_of_benchmark,
};
use crate::analytics::metric::Metric;
use crate::analytics::utility;
use crate::record::{HubSize, Record};

/// One grouped-aggregate row, flat so it appends directly to a CSV file.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub metric: Metric,
    pub aggregation: Aggregation,
    pub group: String,
    pub count: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub group_by: GroupBy,
    pub rows: Vec<SummaryRow>,
}

/// Grouped aggregate of one metric over the view. Groups with no usable
/// values are omitted, so an empty view yields an empty report.
pub fn summary(
    records: &[&Record],
    metric: Metric,
    kind: Aggregation,
    group_by: GroupBy,
) -> SummaryReport {
    let rows = group_aggregate(records, group_by, metric, kind)
        .into_iter()
        .map(|(group, result)| SummaryRow {
            metric,
            aggregation: kind,
            group,
            count: result.count,
            value: result.value,
        })
        .collect();

    SummaryReport {
        generated_at: Utc::now(),
        group_by,
        rows,
    }
}

/// One spoke of the radar chart: the airport's value, its peer benchmark,
/// and the clamped percent-of-benchmark score.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRow {
    pub metric: Metric,
    pub value: f64,
    pub benchmark: f64,
    /// Number of peer records the benchmark was reduced from.
    pub peer_count: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub generated_at: DateTime<Utc>,
    pub loc_id: String,
    pub name: String,
    pub fiscal_year: u16,
    pub rows: Vec<BenchmarkRow>,
}

/// Compares one airport against its peers in a single fiscal year.
///
/// The peer set is every other record in the view for that year; the view is
/// expected to already be narrowed to the peer group of interest (hub size,
/// state) by the filter pipeline. Returns `None` when the airport has no
/// record in the view for that year.
pub fn benchmark(
    records: &[&Record],
    loc_id: &str,
    fiscal_year: u16,
    metrics: &[Metric],
    kind: Aggregation,
) -> Option<BenchmarkReport> {
    let subject = records
        .iter()
        .find(|r| r.loc_id == loc_id && r.fiscal_year == fiscal_year)?;

    let peers: Vec<&Record> = records
        .iter()
        .filter(|r| r.fiscal_year == fiscal_year && r.loc_id != subject.loc_id)
        .copied()
        .collect();

    let rows = metrics
        .iter()
        .map(|&metric| {
            let value = metric.compute(subject);
            let peer = aggregate(&peers, metric, kind);
            BenchmarkRow {
                metric,
                value,
                benchmark: peer.value,
                peer_count: peer.count,
                score: percent_of_benchmark(value, peer.value),
            }
        })
        .collect();

    Some(BenchmarkReport {
        generated_at: Utc::now(),
        loc_id: subject.loc_id.clone(),
        name: subject.name.clone(),
        fiscal_year,
        rows,
    })
}

/// One fiscal year in an airport's trend line.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub fiscal_year: u16,
    pub value: f64,
    /// Year-over-year rate; absent for the first year or after a gap.
    pub yoy: Option<f64>,
    /// Set when the rate failed the outlier screen (shown, not aggregated).
    pub outlier: bool,
    /// Mean peer growth over the same year step, when any peer had one.
    pub peer_growth: Option<f64>,
    /// Normalized growth-vs-peers score, when both rates exist.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub generated_at: DateTime<Utc>,
    pub loc_id: String,
    pub name: String,
    pub metric: Metric,
    pub points: Vec<TrendPoint>,
    /// Compound annual rate from the first to the last year present, when
    /// both endpoint values are positive.
    pub cagr: Option<f64>,
}

/// Builds one airport's multi-year trend for a metric, including peer
/// comparison. Returns `None` when the view holds no records for the
/// airport.
pub fn trend(
    records: &[&Record],
    loc_id: &str,
    metric: Metric,
    policy: &OutlierPolicy,
) -> Option<TrendReport> {
    let mut own: Vec<&Record> = records.iter().filter(|r| r.loc_id == loc_id).copied().collect();
    if own.is_empty() {
        return None;
    }
    own.sort_by_key(|r| r.fiscal_year);

    let steps: Vec<GrowthPoint> = growth_series(&own, metric, policy);
    let step_for = |year: u16| steps.iter().find(|g| g.fiscal_year == year);

    let points = own
        .iter()
        .map(|r| {
            let step = step_for(r.fiscal_year);
            let peer = step.and_then(|_| {
                let result =
                    mean_growth(records, metric, r.fiscal_year - 1, r.fiscal_year, policy);
                (result.count > 0).then_some(result.value)
            });
            TrendPoint {
                fiscal_year: r.fiscal_year,
                value: metric.compute(r),
                yoy: step.map(|g| g.rate),
                outlier: step.is_some_and(|g| g.outlier),
                peer_growth: peer,
                score: match (step, peer) {
                    (Some(g), Some(p)) => Some(growth_score(g.rate, p)),
                    _ => None,
                },
            }
        })
        .collect();

    let first = own.first()?;
    let last = own.last()?;
    let overall = cagr(
        metric.compute(last),
        metric.compute(first),
        u32::from(last.fiscal_year - first.fiscal_year),
    );

    Some(TrendReport {
        generated_at: Utc::now(),
        loc_id: first.loc_id.clone(),
        name: first.name.clone(),
        metric,
        points,
        cagr: overall,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PercentileMark {
    pub p: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub generated_at: DateTime<Utc>,
    pub metric: Metric,
    /// Usable values behind the histogram.
    pub count: usize,
    pub mean: f64,
    pub percentiles: Vec<PercentileMark>,
    pub histogram: Histogram,
    pub annotations: Vec<Annotation>,
}

/// Histogram of a metric over the view with mean/percentile markers and an
/// optionally highlighted airport, labels merged where they would collide.
pub fn distribution(
    records: &[&Record],
    metric: Metric,
    bin_count: usize,
    percentiles: &[f64],
    highlight: Option<&str>,
    collision_gap: usize,
) -> DistributionReport {
    let mut values: Vec<f64> = records
        .iter()
        .filter_map(|r| metric.compute_checked(r))
        .collect();
    let histogram = Histogram::build(&values, bin_count);
    let mean = utility::mean(&values);
    values.sort_by(f64::total_cmp);

    let marks: Vec<PercentileMark> = percentiles
        .iter()
        .map(|&p| PercentileMark {
            p: p.clamp(0.0, 100.0),
            value: utility::percentile(&values, p),
        })
        .collect();

    let mut markers = vec![Marker {
        label: "mean".to_string(),
        value: mean,
    }];
    markers.extend(marks.iter().map(|m| Marker {
        label: format!("p{:.0}", m.p),
        value: m.value,
    }));
    if let Some(loc_id) = highlight {
        // Highlight marker only when the metric is defined for the airport.
        if let Some(value) = records
            .iter()
            .find(|r| r.loc_id == loc_id)
            .and_then(|r| metric.compute_checked(r))
        {
            markers.push(Marker {
                label: loc_id.to_string(),
                value,
            });
        }
    }

    let annotations = annotate(&histogram, &markers, collision_gap);

    DistributionReport {
        generated_at: Utc::now(),
        metric,
        count: values.len(),
        mean,
        percentiles: marks,
        histogram,
        annotations,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub loc_id: String,
    pub name: String,
    pub hub_size: HubSize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterReport {
    pub generated_at: DateTime<Utc>,
    pub x_metric: Metric,
    pub y_metric: Metric,
    pub points: Vec<ScatterPoint>,
    pub quadrant: Option<QuadrantLines>,
}

/// One point per record with both metrics defined, plus percentile quadrant
/// lines over the same point set. Records undefined on either axis drop out
/// of both the points and the reference lines.
pub fn scatter(records: &[&Record], x_metric: Metric, y_metric: Metric, p: f64) -> ScatterReport {
    let usable: Vec<&Record> = records
        .iter()
        .filter(|r| {
            x_metric.compute_checked(r).is_some() && y_metric.compute_checked(r).is_some()
        })
        .copied()
        .collect();

    let points = usable
        .iter()
        .map(|r| ScatterPoint {
            loc_id: r.loc_id.clone(),
            name: r.name.clone(),
            hub_size: r.hub_size,
            x: x_metric.compute(r),
            y: y_metric.compute(r),
        })
        .collect();

    ScatterReport {
        generated_at: Utc::now(),
        x_metric,
        y_metric,
        points,
        quadrant: quadrant_lines(&usable, x_metric, y_metric, p),
    }
}

/// One row of a ranking table, flat for CSV append.
#[derive(Debug, Clone, Serialize)]
pub struct RankRow {
    pub rank: usize,
    pub loc_id: String,
    pub name: String,
    pub state: String,
    pub hub_size: HubSize,
    pub metric: Metric,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    pub generated_at: DateTime<Utc>,
    pub metric: Metric,
    pub ascending: bool,
    pub rows: Vec<RankRow>,
}

/// Top (or, with `ascending`, bottom) `limit` records by metric value.
/// Records where the metric is undefined never appear; rank 1 is the best.
pub fn rank(records: &[&Record], metric: Metric, limit: usize, ascending: bool) -> RankReport {
    let mut scored: Vec<(&Record, f64)> = records
        .iter()
        .filter_map(|r| metric.compute_checked(r).map(|v| (*r, v)))
        .collect();
    scored.sort_by(|a, b| {
        if ascending {
            a.1.total_cmp(&b.1)
        } else {
            b.1.total_cmp(&a.1)
        }
    });

    let rows = scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (r, value))| RankRow {
            rank: i + 1,
            loc_id: r.loc_id.clone(),
            name: r.name.clone(),
            state: r.state.clone(),
            hub_size: r.hub_size,
            metric,
            value,
        })
        .collect();

    RankReport {
        generated_at: Utc::now(),
        metric,
        ascending,
        rows,
    }
}
