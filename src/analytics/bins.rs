//! Equal-width histogram binning and marker placement for distribution
//! charts. Counting uses half-open bins (the last bin closes on the
//! maximum); marker lookup scans closed intervals and takes the first hit.

use serde::Serialize;

/// One histogram bucket over `[range_min, range_max]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub range_min: f64,
    pub range_max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Partitions `values` into `bin_count` equal-width bins spanning the
    /// observed `[min, max]`. Values land in `floor((v - min) / width)`,
    /// clamped so the maximum falls in the last bin rather than one past it.
    /// Empty input or a zero bin count produce an empty histogram; a
    /// degenerate span (all values equal) puts everything in the first bin.
    pub fn build(values: &[f64], bin_count: usize) -> Self {
        if values.is_empty() || bin_count == 0 {
            return Self::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bin_count as f64;

        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| Bin {
                range_min: min + width * i as f64,
                range_max: min + width * (i + 1) as f64,
                count: 0,
            })
            .collect();
        if let Some(last) = bins.last_mut() {
            // Close the top edge exactly on the observed maximum so float
            // drift in `min + width * n` cannot leave max outside the span.
            last.range_max = max;
        }

        for &value in values {
            let idx = if width > 0.0 {
                (((value - min) / width).floor() as usize).min(bin_count - 1)
            } else {
                0
            };
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Overall `(min, max)` covered by the bins, or `None` when empty.
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = self.bins.first()?;
        let last = self.bins.last()?;
        Some((first.range_min, last.range_max))
    }

    /// Index of the first bin whose closed `[range_min, range_max]` interval
    /// contains `value`. Shared edges therefore resolve to the lower bin.
    pub fn locate(&self, value: f64) -> Option<usize> {
        self.bins
            .iter()
            .position(|b| value >= b.range_min && value <= b.range_max)
    }
}

/// A labelled reference value to draw over a histogram (mean, a percentile,
/// or one highlighted entity's value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub label: String,
    pub value: f64,
}

/// A rendered label anchored to one bin. When markers collide, their labels
/// merge into a single annotation but every underlying marker value is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub bin: usize,
    pub label: String,
    pub markers: Vec<Marker>,
}

/// Places markers on the histogram and merges any whose bins sit within
/// `collision_gap` of an already-placed annotation, so labels never overlap.
/// Marker values outside the histogram span are pinned to the nearest edge
/// for placement; the reported value is left untouched.
pub fn annotate(histogram: &Histogram, markers: &[Marker], collision_gap: usize) -> Vec<Annotation> {
    let Some((lo, hi)) = histogram.span() else {
        return Vec::new();
    };

    let mut placed: Vec<(usize, Marker)> = markers
        .iter()
        .filter_map(|m| {
            let bin = histogram.locate(m.value.clamp(lo, hi))?;
            Some((bin, m.clone()))
        })
        .collect();
    placed.sort_by_key(|(bin, _)| *bin);

    let mut annotations: Vec<Annotation> = Vec::new();
    for (bin, marker) in placed {
        match annotations.last_mut() {
            Some(prev) if bin - prev.bin <= collision_gap => {
                prev.label.push_str(" / ");
                prev.label.push_str(&marker.label);
                prev.markers.push(marker);
            }
            _ => annotations.push(Annotation {
                bin,
                label: marker.label.clone(),
                markers: vec![marker],
            }),
        }
    }
    annotations
}
