//! Compliance metrics engine
//!
//! Pure aggregation over a collection of [`TrialRecord`]s:
//!
//! - **TRN reporting**: share of trials reporting a Trial Registration Number
//! - **Registration timing**: prospective (registered on or before enrollment
//!   start) vs retrospective, with the delay in whole weeks for the latter
//! - **Journal membership**: TRN reporting inside vs outside ICMJE member journals
//!
//! ## Empty denominators
//!
//! Every rate whose denominator is empty (no records, no classifiable
//! records, no journals in a membership subset) is reported as `0.0`. Rates
//! are never NaN or infinite.
//!
//! ## Usage
//!
//! ```rust
//! use trial_compliance::metrics::compute_metrics;
//! use trial_compliance::record::TrialRecord;
//!
//! let records = vec![
//!     TrialRecord::builder("A", "JAMA", "2018-06-15")
//!         .trn("NCT01")
//!         .enrollment_date("2018-01-01")
//!         .registration_date("2018-02-01")
//!         .build()?,
//! ];
//!
//! let metrics = compute_metrics(&records);
//! assert_eq!(metrics.retrospective(), 1);
//! assert_eq!(metrics.delays(), &[4]);
//! # Ok::<(), trial_compliance::Error>(())
//! ```

mod histogram;

pub use histogram::{build_delay_histogram, DelayBin, HISTOGRAM_BINS};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{parse_date, TrialRecord};

/// Immutable snapshot of compliance metrics for one record collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMetrics {
    total: usize,
    #[serde(rename = "withTRN")]
    with_trn: usize,
    trn_rate: f64,
    prospective: usize,
    retrospective: usize,
    prospective_rate: f64,
    classified: usize,
    skipped_invalid_dates: usize,
    icmje_total: usize,
    non_icmje_total: usize,
    icmje_trn_rate: f64,
    non_icmje_trn_rate: f64,
    delays: Vec<i64>,
}

impl ComplianceMetrics {
    /// Number of input records.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of records reporting a TRN.
    #[must_use]
    pub const fn with_trn(&self) -> usize {
        self.with_trn
    }

    /// TRN reporting rate, percent.
    #[must_use]
    pub const fn trn_rate(&self) -> f64 {
        self.trn_rate
    }

    /// Prospectively registered trials.
    #[must_use]
    pub const fn prospective(&self) -> usize {
        self.prospective
    }

    /// Retrospectively registered trials.
    #[must_use]
    pub const fn retrospective(&self) -> usize {
        self.retrospective
    }

    /// Share of classified trials registered prospectively, percent.
    #[must_use]
    pub const fn prospective_rate(&self) -> f64 {
        self.prospective_rate
    }

    /// Records eligible for timing classification: TRN reported and both
    /// dates present and parseable.
    #[must_use]
    pub const fn classified(&self) -> usize {
        self.classified
    }

    /// Records with a TRN and both dates present where at least one date
    /// failed to parse. These are left out of timing classification.
    #[must_use]
    pub const fn skipped_invalid_dates(&self) -> usize {
        self.skipped_invalid_dates
    }

    /// Records published in ICMJE member journals.
    #[must_use]
    pub const fn icmje_total(&self) -> usize {
        self.icmje_total
    }

    /// Records published in non-member journals.
    #[must_use]
    pub const fn non_icmje_total(&self) -> usize {
        self.non_icmje_total
    }

    /// TRN reporting rate within ICMJE member journals, percent.
    #[must_use]
    pub const fn icmje_trn_rate(&self) -> f64 {
        self.icmje_trn_rate
    }

    /// TRN reporting rate within non-member journals, percent.
    #[must_use]
    pub const fn non_icmje_trn_rate(&self) -> f64 {
        self.non_icmje_trn_rate
    }

    /// Journal-membership compliance gap in percentage points
    /// (member rate minus non-member rate).
    #[must_use]
    pub fn compliance_gap(&self) -> f64 {
        self.icmje_trn_rate - self.non_icmje_trn_rate
    }

    /// Registration delays in whole weeks, one per retrospective record.
    #[must_use]
    pub fn delays(&self) -> &[i64] {
        &self.delays
    }

    /// The 20-bin delay histogram for this snapshot.
    #[must_use]
    pub fn histogram(&self) -> Vec<DelayBin> {
        build_delay_histogram(&self.delays)
    }
}

/// Registration timing of a record with usable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timing {
    Prospective,
    Retrospective { delay_weeks: i64 },
}

/// Outcome of checking a record for timing classification.
enum Eligibility {
    Classified(Timing),
    InvalidDates,
    NotApplicable,
}

fn classify(record: &TrialRecord) -> Eligibility {
    let (Some(enrollment), Some(registration)) =
        (record.enrollment_date(), record.registration_date())
    else {
        return Eligibility::NotApplicable;
    };
    if !record.has_trn() {
        return Eligibility::NotApplicable;
    }

    let (Ok(enrollment), Ok(registration)) = (parse_date(enrollment), parse_date(registration))
    else {
        debug!(id = record.id(), "skipping record with unparseable dates");
        return Eligibility::InvalidDates;
    };

    if registration <= enrollment {
        Eligibility::Classified(Timing::Prospective)
    } else {
        // registration is strictly later, so whole weeks are non-negative
        let delay_weeks = (registration - enrollment).num_weeks();
        Eligibility::Classified(Timing::Retrospective { delay_weeks })
    }
}

/// Percentage `numerator / denominator * 100`, or `0.0` for an empty denominator.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

/// Compute compliance metrics over a collection of trial records.
///
/// Record order does not affect any count or rate; `delays` follows input
/// order. Never fails: records that cannot be classified for timing are
/// excluded from the prospective/retrospective split.
#[must_use]
pub fn compute_metrics(records: &[TrialRecord]) -> ComplianceMetrics {
    let total = records.len();
    let with_trn = records.iter().filter(|r| r.has_trn()).count();

    let mut prospective = 0;
    let mut retrospective = 0;
    let mut skipped_invalid_dates = 0;
    let mut delays = Vec::new();

    for record in records {
        match classify(record) {
            Eligibility::Classified(Timing::Prospective) => prospective += 1,
            Eligibility::Classified(Timing::Retrospective { delay_weeks }) => {
                retrospective += 1;
                delays.push(delay_weeks);
            }
            Eligibility::InvalidDates => skipped_invalid_dates += 1,
            Eligibility::NotApplicable => {}
        }
    }
    let classified = prospective + retrospective;

    let (icmje, non_icmje): (Vec<&TrialRecord>, Vec<&TrialRecord>) =
        records.iter().partition(|r| r.is_icmje_member());
    let icmje_with_trn = icmje.iter().filter(|r| r.has_trn()).count();
    let non_icmje_with_trn = non_icmje.iter().filter(|r| r.has_trn()).count();

    let metrics = ComplianceMetrics {
        total,
        with_trn,
        trn_rate: percentage(with_trn, total),
        prospective,
        retrospective,
        prospective_rate: percentage(prospective, classified),
        classified,
        skipped_invalid_dates,
        icmje_total: icmje.len(),
        non_icmje_total: non_icmje.len(),
        icmje_trn_rate: percentage(icmje_with_trn, icmje.len()),
        non_icmje_trn_rate: percentage(non_icmje_with_trn, non_icmje.len()),
        delays,
    };

    debug!(
        total,
        with_trn,
        prospective,
        retrospective,
        skipped_invalid_dates,
        "computed compliance metrics"
    );

    metrics
}
