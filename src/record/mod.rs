//! Trial records - the input to compliance metrics
//!
//! A [`TrialRecord`] describes one published clinical trial: which journal
//! published it, whether a Trial Registration Number (TRN) was reported, and
//! the enrollment/registration dates used for timing classification.
//!
//! ## Usage
//!
//! ```rust
//! use trial_compliance::record::TrialRecord;
//!
//! let record = TrialRecord::builder("PMID-10001", "JAMA", "2018-06-15")
//!     .icmje_member(true)
//!     .trn("NCT01234567")
//!     .enrollment_date("2016-03-01")
//!     .registration_date("2016-02-10")
//!     .build()?;
//!
//! assert!(record.has_trn());
//! # Ok::<(), trial_compliance::Error>(())
//! ```

mod quartile;
mod trial_record;

pub use quartile::ImpactQuartile;
pub use trial_record::{TrialRecord, TrialRecordBuilder};

use chrono::NaiveDate;

use crate::{Error, Result};

/// Date format used by every date field (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the text is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(text.to_string()))
}
