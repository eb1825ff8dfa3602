//! # trial-compliance: Clinical-Trial Registration Compliance Analytics
//!
//! Audits how well published clinical trials comply with registration
//! requirements:
//!
//! - **TRN reporting rate**: share of papers reporting a Trial Registration Number
//! - **Registration timing**: prospective (registered on or before enrollment
//!   start) vs retrospective, with a 20-week delay histogram
//! - **Journal membership gap**: TRN reporting inside vs outside ICMJE member journals
//!
//! Records come from CSV or Parquet study tables ([`storage`]) or JSON, metrics are
//! computed by a pure engine ([`metrics`]), and a secondary
//! [`analysis`] module extracts registration metadata from a paper via an
//! external AI service.
//!
//! ## Example Usage
//!
//! ```rust
//! use trial_compliance::metrics::compute_metrics;
//! use trial_compliance::record::TrialRecord;
//!
//! let records = vec![
//!     TrialRecord::builder("A", "JAMA", "2018-06-15")
//!         .icmje_member(true)
//!         .trn("NCT01")
//!         .enrollment_date("2018-01-01")
//!         .registration_date("2017-12-15")
//!         .build()?,
//!     TrialRecord::builder("B", "General Medical Journal", "2018-07-01").build()?,
//! ];
//!
//! let metrics = compute_metrics(&records);
//! assert_eq!(metrics.total(), 2);
//! assert_eq!(metrics.prospective(), 1);
//! assert!((metrics.trn_rate() - 50.0).abs() < f64::EPSILON);
//!
//! let histogram = metrics.histogram();
//! assert_eq!(histogram.len(), 20);
//! # Ok::<(), trial_compliance::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod error;
pub mod metrics;
pub mod record;
pub mod storage;

pub use error::{Error, Result};
pub use metrics::{build_delay_histogram, compute_metrics, ComplianceMetrics, DelayBin};
pub use record::TrialRecord;
