//! Predicate pipeline producing the working view of the record collection.
//!
//! A [`RecordFilter`] is a set of optional predicates combined with logical
//! AND: fiscal-year membership, state membership, hub-size membership, and a
//! trailing-window activity screen. Unset predicates pass everything, so the
//! default filter is the identity. Applying a filter never mutates the
//! backing collection; it borrows, and many views may coexist.
//!
//! Every application is a fresh full pass. Collections top out in the low
//! thousands of rows, so there is no incremental state to maintain.

use std::collections::BTreeSet;

use crate::analytics::metric::Metric;
use crate::record::{HubSize, Record};

/// Trailing-window activity screen.
///
/// An entity is "active" when its volume metric is strictly positive in at
/// least one of the trailing `window` fiscal years, where the latest year is
/// taken from the records being filtered. Entities that fail the screen lose
/// *all* their records, not just the quiet years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityWindow {
    pub metric: Metric,
    /// Number of trailing fiscal years to inspect, minimum 1.
    pub window: u16,
}

impl Default for ActivityWindow {
    fn default() -> Self {
        Self {
            metric: Metric::Enplanements,
            window: 3,
        }
    }
}

impl ActivityWindow {
    fn active_ids(&self, pool: &[&Record]) -> BTreeSet<String> {
        let Some(latest) = pool.iter().map(|r| r.fiscal_year).max() else {
            return BTreeSet::new();
        };
        let cutoff = latest.saturating_sub(self.window.max(1) - 1);

        pool.iter()
            .filter(|r| r.fiscal_year >= cutoff && self.metric.compute(r) > 0.0)
            .map(|r| r.loc_id.clone())
            .collect()
    }
}

/// Composable AND-filter over the record collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    years: Option<BTreeSet<u16>>,
    states: Option<BTreeSet<String>>,
    hub_sizes: Option<BTreeSet<HubSize>>,
    activity: Option<ActivityWindow>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the given fiscal years.
    pub fn years(mut self, years: impl IntoIterator<Item = u16>) -> Self {
        self.years = Some(years.into_iter().collect());
        self
    }

    /// Keep only the given states (matched case-insensitively).
    pub fn states<S: AsRef<str>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.states = Some(
            states
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_uppercase())
                .collect(),
        );
        self
    }

    /// Keep only the given hub-size classes.
    pub fn hub_sizes(mut self, sizes: impl IntoIterator<Item = HubSize>) -> Self {
        self.hub_sizes = Some(sizes.into_iter().collect());
        self
    }

    /// Require entities to pass the trailing-window activity screen.
    pub fn active(mut self, window: ActivityWindow) -> Self {
        self.activity = Some(window);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_none()
            && self.states.is_none()
            && self.hub_sizes.is_none()
            && self.activity.is_none()
    }

    /// Applies the filter to any iterable of record references and returns
    /// the matching view. Idempotent: filtering a filtered view again
    /// changes nothing.
    pub fn apply<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<&'a Record> {
        let view: Vec<&Record> = records
            .into_iter()
            .filter(|r| self.years.as_ref().is_none_or(|ys| ys.contains(&r.fiscal_year)))
            .filter(|r| self.states.as_ref().is_none_or(|ss| ss.contains(&r.state)))
            .filter(|r| {
                self.hub_sizes
                    .as_ref()
                    .is_none_or(|hs| hs.contains(&r.hub_size))
            })
            .collect();

        // The activity window anchors on the latest year still present after
        // the membership predicates, which keeps repeated application stable.
        let Some(activity) = &self.activity else {
            return view;
        };
        let active_ids = activity.active_ids(&view);
        view.into_iter()
            .filter(|r| active_ids.contains(&r.loc_id))
            .collect()
    }
}
