//! Typed Form 127 records and row normalization.
//!
//! A [`Record`] is one fiscal-year observation for one airport, identified by
//! `(loc_id, fiscal_year)`. Every numeric field is guaranteed finite: absent,
//! null, or unparseable source values normalize to `0.0` via [`safe_number`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported fiscal-year range. Rows outside it are rejected during
/// normalization rather than carried as bad data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearPolicy {
    pub min: u16,
    pub max: u16,
}

impl Default for YearPolicy {
    fn default() -> Self {
        Self {
            min: 2019,
            max: 2024,
        }
    }
}

impl YearPolicy {
    pub fn contains(&self, year: i64) -> bool {
        year >= i64::from(self.min) && year <= i64::from(self.max)
    }
}

/// FAA hub-size classification of an airport.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum HubSize {
    Large,
    Medium,
    Small,
    /// Catch-all class; also the fallback for missing or unrecognized values.
    #[default]
    Nonhub,
}

impl HubSize {
    /// Lenient parser for raw dataset values (`"L"`, `"Large"`, etc.).
    /// Anything unrecognized falls back to [`HubSize::Nonhub`].
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) => s.trim().parse().unwrap_or(HubSize::Nonhub),
            None => HubSize::Nonhub,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HubSize::Large => "large",
            HubSize::Medium => "medium",
            HubSize::Small => "small",
            HubSize::Nonhub => "nonhub",
        }
    }
}

impl FromStr for HubSize {
    type Err = anyhow::Error;

    /// Strict parser for CLI input: unknown values are an error, never a
    /// silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LARGE" => Ok(HubSize::Large),
            "M" | "MEDIUM" => Ok(HubSize::Medium),
            "S" | "SMALL" => Ok(HubSize::Small),
            "N" | "NONHUB" | "NON-HUB" => Ok(HubSize::Nonhub),
            other => Err(anyhow::anyhow!(
                "unknown hub size '{other}' (expected one of: large, medium, small, nonhub)"
            )),
        }
    }
}

impl fmt::Display for HubSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized fiscal-year observation for one airport.
///
/// Dollar fields are reported in whole dollars, `landed_weight` in thousands
/// of pounds. Records are immutable once built; all derived quantities are
/// computed by the `analytics` modules without touching the source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub loc_id: String,
    pub fiscal_year: u16,
    pub name: String,
    pub city: String,
    pub state: String,
    pub hub_size: HubSize,

    // geographic; None when the source value is absent or out of range
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // aeronautical operating revenue
    pub passenger_airline_landing_fees: f64,
    pub terminal_arrival_rents: f64,
    pub terminal_apron_charges: f64,
    pub federal_inspection_fees: f64,
    pub other_passenger_aero_revenue: f64,
    pub cargo_landing_fees: f64,
    pub ga_landing_fees: f64,
    pub fbo_revenue: f64,
    pub cargo_hangar_rentals: f64,
    pub fuel_sales_net: f64,
    pub fuel_flowage_fees: f64,
    pub security_reimbursements: f64,
    pub other_aero_revenue: f64,
    pub total_aero_revenue: f64,

    // non-aeronautical operating revenue
    pub land_and_nonterminal_leases: f64,
    pub terminal_food_and_beverage: f64,
    pub terminal_retail: f64,
    pub terminal_services_other: f64,
    pub rental_car_revenue: f64,
    pub parking_and_ground_transport: f64,
    pub hotel_revenue: f64,
    pub other_nonaero_revenue: f64,
    pub total_nonaero_revenue: f64,

    pub total_operating_revenue: f64,

    // operating expenses
    pub personnel_compensation: f64,
    pub communications_and_utilities: f64,
    pub supplies_and_materials: f64,
    pub contractual_services: f64,
    pub insurance_claims_and_settlements: f64,
    pub other_operating_expense: f64,
    pub depreciation: f64,
    pub total_operating_expense: f64,

    // non-operating items
    pub interest_income: f64,
    pub interest_expense: f64,
    pub grant_receipts: f64,
    pub passenger_facility_charges: f64,
    pub capital_expenditures: f64,
    pub special_items: f64,

    // debt and cash position
    pub total_debt: f64,
    pub new_debt_issued: f64,
    pub debt_service_principal: f64,
    pub debt_service_interest: f64,
    pub unrestricted_cash: f64,
    pub restricted_financial_assets: f64,

    // operational counts
    pub enplanements: f64,
    pub landed_weight: f64,
    pub air_carrier_operations: f64,
    pub ga_operations: f64,
    pub military_operations: f64,
    pub based_aircraft: f64,
    pub full_time_employees: f64,
    pub part_time_employees: f64,
}

/// Coerces a raw JSON value into a finite `f64`.
///
/// Numbers pass through; numeric strings parse; everything else — null,
/// booleans, empty or non-numeric strings, and anything that parses to
/// `NaN`/`Infinity` — becomes `0.0`.
pub fn safe_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn num(map: &serde_json::Map<String, Value>, key: &str) -> f64 {
    map.get(key).map(safe_number).unwrap_or(0.0)
}

fn text(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Parses a fiscal year that may arrive as an integer, a float with no
/// fractional part, or a numeric string.
fn parse_fiscal_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// A coordinate is kept only when finite and inside the given bounds.
fn coordinate(map: &serde_json::Map<String, Value>, key: &str, bound: f64) -> Option<f64> {
    let value = map.get(key)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (parsed.is_finite() && parsed.abs() <= bound).then_some(parsed)
}

impl Record {
    /// Normalizes one raw dataset row into a [`Record`].
    ///
    /// Returns `None` (row rejected) when the row is not an object, `loc_id`
    /// is missing or empty, or `fiscal_year` is not a finite integer inside
    /// `years`. Every other irregularity degrades to a default instead.
    pub fn from_raw(row: &Value, years: &YearPolicy) -> Option<Record> {
        let map = row.as_object()?;

        let loc_id = text(map, "loc_id");
        if loc_id.is_empty() {
            return None;
        }

        let year = map.get("fiscal_year").and_then(parse_fiscal_year)?;
        if !years.contains(year) {
            return None;
        }

        Some(Record {
            loc_id: loc_id.to_ascii_uppercase(),
            fiscal_year: year as u16,
            name: text(map, "name"),
            city: text(map, "city"),
            state: text(map, "state").to_ascii_uppercase(),
            hub_size: HubSize::from_raw(map.get("hub_size").and_then(Value::as_str)),

            latitude: coordinate(map, "latitude", 90.0),
            longitude: coordinate(map, "longitude", 180.0),

            passenger_airline_landing_fees: num(map, "passenger_airline_landing_fees"),
            terminal_arrival_rents: num(map, "terminal_arrival_rents"),
            terminal_apron_charges: num(map, "terminal_apron_charges"),
            federal_inspection_fees: num(map, "federal_inspection_fees"),
            other_passenger_aero_revenue: num(map, "other_passenger_aero_revenue"),
            cargo_landing_fees: num(map, "cargo_landing_fees"),
            ga_landing_fees: num(map, "ga_landing_fees"),
            fbo_revenue: num(map, "fbo_revenue"),
            cargo_hangar_rentals: num(map, "cargo_hangar_rentals"),
            fuel_sales_net: num(map, "fuel_sales_net"),
            fuel_flowage_fees: num(map, "fuel_flowage_fees"),
            security_reimbursements: num(map, "security_reimbursements"),
            other_aero_revenue: num(map, "other_aero_revenue"),
            total_aero_revenue: num(map, "total_aero_revenue"),

            land_and_nonterminal_leases: num(map, "land_and_nonterminal_leases"),
            terminal_food_and_beverage: num(map, "terminal_food_and_beverage"),
            terminal_retail: num(map, "terminal_retail"),
            terminal_services_other: num(map, "terminal_services_other"),
            rental_car_revenue: num(map, "rental_car_revenue"),
            parking_and_ground_transport: num(map, "parking_and_ground_transport"),
            hotel_revenue: num(map, "hotel_revenue"),
            other_nonaero_revenue: num(map, "other_nonaero_revenue"),
            total_nonaero_revenue: num(map, "total_nonaero_revenue"),

            total_operating_revenue: num(map, "total_operating_revenue"),

            personnel_compensation: num(map, "personnel_compensation"),
            communications_and_utilities: num(map, "communications_and_utilities"),
            supplies_and_materials: num(map, "supplies_and_materials"),
            contractual_services: num(map, "contractual_services"),
            insurance_claims_and_settlements: num(map, "insurance_claims_and_settlements"),
            other_operating_expense: num(map, "other_operating_expense"),
            depreciation: num(map, "depreciation"),
            total_operating_expense: num(map, "total_operating_expense"),

            interest_income: num(map, "interest_income"),
            interest_expense: num(map, "interest_expense"),
            grant_receipts: num(map, "grant_receipts"),
            passenger_facility_charges: num(map, "passenger_facility_charges"),
            capital_expenditures: num(map, "capital_expenditures"),
            special_items: num(map, "special_items"),

            total_debt: num(map, "total_debt"),
            new_debt_issued: num(map, "new_debt_issued"),
            debt_service_principal: num(map, "debt_service_principal"),
            debt_service_interest: num(map, "debt_service_interest"),
            unrestricted_cash: num(map, "unrestricted_cash"),
            restricted_financial_assets: num(map, "restricted_financial_assets"),

            enplanements: num(map, "enplanements"),
            landed_weight: num(map, "landed_weight"),
            air_carrier_operations: num(map, "air_carrier_operations"),
            ga_operations: num(map, "ga_operations"),
            military_operations: num(map, "military_operations"),
            based_aircraft: num(map, "based_aircraft"),
            full_time_employees: num(map, "full_time_employees"),
            part_time_employees: num(map, "part_time_employees"),
        })
    }
}
