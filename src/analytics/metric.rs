//! Closed registry of chartable metrics.
//!
//! Every metric the dashboard can plot is a [`Metric`] variant with an
//! explicit calculator; string identifiers parse through [`FromStr`] and
//! unknown names are rejected rather than resolving to a silent default.
//!
//! Ratio metrics guard their denominator with `> 0`. [`Metric::compute`]
//! resolves a failed guard to `0.0` (the pipeline-wide "safe" value for
//! display); [`Metric::compute_checked`] returns `None` instead, which is
//! what aggregation uses so zero-denominator records drop out of averages
//! rather than dragging them toward zero.

use anyhow::bail;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // level metrics (raw dataset fields)
    Enplanements,
    OperatingRevenue,
    OperatingExpense,
    TotalDebt,
    UnrestrictedCash,
    LandedWeight,

    // per-enplanement ratios
    RevenuePerEnplanement,
    CostPerEnplanement,
    DebtPerEnplanement,
    OpexExDepreciationPerEnplanement,

    // other ratio metrics
    DaysCashOnHand,
    DebtToRevenue,
    OperatingMargin,
    NonAeroShare,
}

/// Ratio numerator over a `> 0`-guarded denominator; `None` when the guard
/// fails.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::Enplanements,
        Metric::OperatingRevenue,
        Metric::OperatingExpense,
        Metric::TotalDebt,
        Metric::UnrestrictedCash,
        Metric::LandedWeight,
        Metric::RevenuePerEnplanement,
        Metric::CostPerEnplanement,
        Metric::DebtPerEnplanement,
        Metric::OpexExDepreciationPerEnplanement,
        Metric::DaysCashOnHand,
        Metric::DebtToRevenue,
        Metric::OperatingMargin,
        Metric::NonAeroShare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Enplanements => "enplanements",
            Metric::OperatingRevenue => "operating_revenue",
            Metric::OperatingExpense => "operating_expense",
            Metric::TotalDebt => "total_debt",
            Metric::UnrestrictedCash => "unrestricted_cash",
            Metric::LandedWeight => "landed_weight",
            Metric::RevenuePerEnplanement => "revenue_per_enplanement",
            Metric::CostPerEnplanement => "cost_per_enplanement",
            Metric::DebtPerEnplanement => "debt_per_enplanement",
            Metric::OpexExDepreciationPerEnplanement => "opex_ex_depreciation_per_enplanement",
            Metric::DaysCashOnHand => "days_cash_on_hand",
            Metric::DebtToRevenue => "debt_to_revenue",
            Metric::OperatingMargin => "operating_margin",
            Metric::NonAeroShare => "non_aero_share",
        }
    }

    /// True for denominator-based metrics. Growth-rate screening treats
    /// these differently from dollar/count levels (see `growth`).
    pub fn is_ratio(&self) -> bool {
        !matches!(
            self,
            Metric::Enplanements
                | Metric::OperatingRevenue
                | Metric::OperatingExpense
                | Metric::TotalDebt
                | Metric::UnrestrictedCash
                | Metric::LandedWeight
        )
    }

    /// Metric value for one record, or `None` when the metric is undefined
    /// for it (denominator ≤ 0).
    pub fn compute_checked(&self, r: &Record) -> Option<f64> {
        match self {
            Metric::Enplanements => Some(r.enplanements),
            Metric::OperatingRevenue => Some(r.total_operating_revenue),
            Metric::OperatingExpense => Some(r.total_operating_expense),
            Metric::TotalDebt => Some(r.total_debt),
            Metric::UnrestrictedCash => Some(r.unrestricted_cash),
            Metric::LandedWeight => Some(r.landed_weight),

            Metric::RevenuePerEnplanement => ratio(r.total_operating_revenue, r.enplanements),
            Metric::CostPerEnplanement => ratio(r.total_operating_expense, r.enplanements),
            Metric::DebtPerEnplanement => ratio(r.total_debt, r.enplanements),
            Metric::OpexExDepreciationPerEnplanement => {
                ratio(r.total_operating_expense - r.depreciation, r.enplanements)
            }

            Metric::DaysCashOnHand => {
                ratio(r.unrestricted_cash * 365.0, r.total_operating_expense)
            }
            Metric::DebtToRevenue => ratio(r.total_debt, r.total_operating_revenue),
            Metric::OperatingMargin => ratio(
                r.total_operating_revenue - r.total_operating_expense,
                r.total_operating_revenue,
            ),
            Metric::NonAeroShare => ratio(r.total_nonaero_revenue, r.total_operating_revenue),
        }
    }

    /// Metric value with the undefined case resolved to `0.0`. Callers that
    /// must tell "undefined" from "zero" use [`Metric::compute_checked`].
    pub fn compute(&self, r: &Record) -> f64 {
        self.compute_checked(r).unwrap_or(0.0)
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        for metric in Metric::ALL {
            if metric.as_str() == wanted {
                return Ok(metric);
            }
        }
        let known: Vec<&str> = Metric::ALL.iter().map(Metric::as_str).collect();
        bail!("unknown metric '{wanted}' (known metrics: {})", known.join(", "));
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
