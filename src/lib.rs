//! Derived-metrics and aggregation engine for FAA Form 127 airport
//! financial data.
//!
//! The library splits into a pure computation core (`record`, `analytics`)
//! and a thin I/O shell (`fetch`, `dataset`, `output`) that brings the
//! dataset into memory and persists reports. The core takes everything as
//! explicit parameters and holds no state.

pub mod analytics;
pub mod dataset;
pub mod fetch;
pub mod output;
pub mod record;
