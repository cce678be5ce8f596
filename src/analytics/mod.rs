//! The derived-metrics and aggregation engine.
//!
//! Everything in here is pure and synchronous: functions take the normalized
//! record collection (or a filtered view of it) plus explicit parameters and
//! return plain data. No module keeps state between calls, so identical
//! inputs always produce identical outputs.

pub mod aggregate;
pub mod bins;
pub mod filter;
pub mod growth;
pub mod metric;
pub mod report;
pub mod utility;
