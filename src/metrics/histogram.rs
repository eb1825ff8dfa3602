//! Registration-delay histogram
//!
//! Fixed-width, dense binning of retrospective registration delays so a chart
//! or table always renders the same 20-week axis.

use serde::{Deserialize, Serialize};

/// Number of histogram bins (weeks 1 through 20).
pub const HISTOGRAM_BINS: usize = 20;

/// One histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayBin {
    /// Week label, `1..=20` (bin index `i` is week `i + 1`)
    pub week: u32,
    /// Number of delays that landed in this bin
    pub count: usize,
}

/// Bin registration delays (whole weeks) into 20 dense bins.
///
/// Each delay `d` increments bin `clamp(d, 0, 19)`. Every delay of 19 weeks
/// or more lands in the final (week 20) bin, compressing the long tail.
/// Bins that receive no delays are still returned with `count == 0`.
///
/// # Example
///
/// ```rust
/// use trial_compliance::metrics::build_delay_histogram;
///
/// let bins = build_delay_histogram(&[0, 4, 19, 52]);
/// assert_eq!(bins.len(), 20);
/// assert_eq!(bins[0].count, 1);
/// assert_eq!(bins[4].count, 1);
/// assert_eq!(bins[19].count, 2);
/// ```
#[must_use]
pub fn build_delay_histogram(delays: &[i64]) -> Vec<DelayBin> {
    let mut bins: Vec<DelayBin> = (1u32..)
        .take(HISTOGRAM_BINS)
        .map(|week| DelayBin { week, count: 0 })
        .collect();

    for &delay in delays {
        bins[bin_index(delay)].count += 1;
    }

    bins
}

fn bin_index(delay: i64) -> usize {
    let last = HISTOGRAM_BINS - 1;
    // only delays wider than usize fail the conversion; they belong in the tail
    usize::try_from(delay.max(0)).map_or(last, |weeks| weeks.min(last))
}
