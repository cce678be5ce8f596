//! Full-pipeline tests over the JSON fixture: load, normalize, filter, and
//! build each report the dashboard consumes.

use form127_metrics::analytics::aggregate::{Aggregation, GroupBy};
use form127_metrics::analytics::filter::{ActivityWindow, RecordFilter};
use form127_metrics::analytics::growth::OutlierPolicy;
use form127_metrics::analytics::metric::Metric;
use form127_metrics::analytics::report;
use form127_metrics::dataset;
use form127_metrics::record::{Record, YearPolicy};

const FIXTURE: &str = "tests/fixtures/form127_sample.json";

async fn load_fixture() -> Vec<Record> {
    dataset::load(FIXTURE, &YearPolicy::default())
        .await
        .expect("fixture should load")
}

#[tokio::test]
async fn test_load_drops_malformed_rows() {
    let records = load_fixture().await;
    // 15 fixture rows: 12 valid, 1 out-of-range year, 1 missing loc_id,
    // 1 unparseable year
    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| r.enplanements.is_finite()));
    assert!(!records.iter().any(|r| r.loc_id == "OLD" || r.loc_id == "BAD"));
}

#[tokio::test]
async fn test_gzipped_payload_loads_identically() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let plain = std::fs::read(FIXTURE).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&plain).unwrap();
    let gzipped = encoder.finish().unwrap();

    let rows = dataset::parse_rows(&gzipped).unwrap();
    let records = dataset::normalize(&rows, &YearPolicy::default());
    assert_eq!(records.len(), load_fixture().await.len());
}

#[tokio::test]
async fn test_activity_screen_over_full_collection() {
    let records = load_fixture().await;

    // Window of 3 reaches back to 2021, where XNA still had enplanements;
    // MQY never does and loses all its records.
    let view = RecordFilter::new()
        .active(ActivityWindow {
            metric: Metric::Enplanements,
            window: 3,
        })
        .apply(&records);
    assert_eq!(view.len(), 9);
    assert!(view.iter().any(|r| r.loc_id == "XNA"));
    assert!(view.iter().all(|r| r.loc_id != "MQY"));

    // Window of 1 looks only at 2023 and drops XNA entirely too.
    let view = RecordFilter::new()
        .active(ActivityWindow {
            metric: Metric::Enplanements,
            window: 1,
        })
        .apply(&records);
    assert_eq!(view.len(), 6);
    assert!(view.iter().all(|r| r.loc_id == "BNA" || r.loc_id == "ATL"));
}

#[tokio::test]
async fn test_summary_by_year() {
    let records = load_fixture().await;
    let view = RecordFilter::new()
        .years([2022])
        .active(ActivityWindow {
            metric: Metric::Enplanements,
            window: 1,
        })
        .apply(&records);

    let report = report::summary(
        &view,
        Metric::Enplanements,
        Aggregation::Mean,
        GroupBy::FiscalYear,
    );
    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.group, "2022");
    assert_eq!(row.count, 2);
    // (10M BNA + 47M ATL) / 2
    assert_eq!(row.value, 28_500_000.0);
}

#[tokio::test]
async fn test_benchmark_excludes_undefined_peers() {
    let records = load_fixture().await;
    let view = RecordFilter::new().years([2022]).apply(&records);

    let report = report::benchmark(
        &view,
        "BNA",
        2022,
        &[Metric::RevenuePerEnplanement],
        Aggregation::Mean,
    )
    .unwrap();

    let row = &report.rows[0];
    assert_eq!(row.value, 27.5); // 275M / 10M
    // XNA and MQY have zero enplanements in 2022, so only ATL is a usable
    // peer: 730M / 47M
    assert_eq!(row.peer_count, 1);
    assert!((row.benchmark - 730.0 / 47.0).abs() < 1e-9);
    assert!(row.score > 100.0 && row.score <= 200.0);
}

#[tokio::test]
async fn test_trend_with_peer_growth() {
    let records = load_fixture().await;
    let view = RecordFilter::new().apply(&records);

    let report = report::trend(
        &view,
        "BNA",
        Metric::Enplanements,
        &OutlierPolicy::default(),
    )
    .unwrap();

    assert_eq!(report.points.len(), 3);
    assert_eq!(report.points[0].yoy, None);

    // 2021 -> 2022: 9M -> 10M
    let p2022 = &report.points[1];
    assert!((p2022.yoy.unwrap() - 1.0 / 9.0).abs() < 1e-9);
    assert!(!p2022.outlier);
    assert!(p2022.peer_growth.is_some());
    assert!(p2022.score.is_some());

    // (11M / 9M)^(1/2) - 1
    let expected_cagr = (11.0_f64 / 9.0).sqrt() - 1.0;
    assert!((report.cagr.unwrap() - expected_cagr).abs() < 1e-9);
}

#[tokio::test]
async fn test_distribution_counts_every_usable_value() {
    let records = load_fixture().await;
    let view = RecordFilter::new().years([2023]).apply(&records);

    let report = report::distribution(
        &view,
        Metric::Enplanements,
        5,
        &[50.0],
        Some("BNA"),
        1,
    );

    assert_eq!(report.count, 4);
    let binned: usize = report.histogram.bins.iter().map(|b| b.count).sum();
    assert_eq!(binned, 4);
    assert!(!report.annotations.is_empty());
    // Every marker survives annotation merging.
    let markers: usize = report.annotations.iter().map(|a| a.markers.len()).sum();
    assert_eq!(markers, 3); // mean, p50, BNA highlight
}

#[tokio::test]
async fn test_scatter_with_quadrants() {
    let records = load_fixture().await;
    let view = RecordFilter::new().years([2023]).apply(&records);

    let report = report::scatter(
        &view,
        Metric::Enplanements,
        Metric::RevenuePerEnplanement,
        50.0,
    );

    // XNA and MQY have zero 2023 enplanements: undefined on the y axis.
    assert_eq!(report.points.len(), 2);
    assert!(report.quadrant.is_some());
}

#[tokio::test]
async fn test_rank_by_days_cash_on_hand() {
    let records = load_fixture().await;
    let view = RecordFilter::new().years([2023]).apply(&records);

    let report = report::rank(&view, Metric::DaysCashOnHand, 10, false);
    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.rows[0].rank, 1);
    // ATL: 1.02B * 365 / 660M ≈ 564 days, the deepest cash position
    assert_eq!(report.rows[0].loc_id, "ATL");
    for pair in report.rows.windows(2) {
        assert!(pair[0].value >= pair[1].value);
    }
}
