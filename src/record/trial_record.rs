//! Trial Record - one published clinical trial

use serde::{Deserialize, Serialize};

use super::{parse_date, ImpactQuartile};
use crate::{Error, Result};

/// Trial Record represents one published clinical trial study.
///
/// Enrollment and registration dates are kept as the raw `YYYY-MM-DD` text
/// they arrived in. They may be absent even when a TRN was reported (for
/// example when extracted from a paper by the analysis service), and they may
/// fail to parse; the metrics engine checks both independently. Blank dates
/// are stored as absent.
///
/// Deserialization goes through [`TrialRecordBuilder`], so records read from
/// JSON satisfy the same invariants as records built in code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "RawTrialRecord")]
pub struct TrialRecord {
    id: String,
    journal_name: String,
    #[serde(rename = "isICMJEMember")]
    is_icmje_member: bool,
    #[serde(rename = "hasTRN")]
    has_trn: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enrollment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registration_date: Option<String>,
    publication_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    impact_factor_quartile: Option<ImpactQuartile>,
}

impl TrialRecord {
    /// Create a builder with the fields every record carries.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier (e.g. a PubMed ID)
    /// * `journal_name` - Publishing journal
    /// * `publication_date` - Publication date, `YYYY-MM-DD`
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        journal_name: impl Into<String>,
        publication_date: impl Into<String>,
    ) -> TrialRecordBuilder {
        TrialRecordBuilder::new(id, journal_name, publication_date)
    }

    /// Get the record ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the journal name.
    #[must_use]
    pub fn journal_name(&self) -> &str {
        &self.journal_name
    }

    /// Whether the publishing journal is an ICMJE member.
    #[must_use]
    pub const fn is_icmje_member(&self) -> bool {
        self.is_icmje_member
    }

    /// Whether a Trial Registration Number was reported.
    #[must_use]
    pub const fn has_trn(&self) -> bool {
        self.has_trn
    }

    /// Get the Trial Registration Number, if reported.
    #[must_use]
    pub fn trn(&self) -> Option<&str> {
        self.trn.as_deref()
    }

    /// Get the raw enrollment start date, if present.
    #[must_use]
    pub fn enrollment_date(&self) -> Option<&str> {
        self.enrollment_date.as_deref()
    }

    /// Get the raw registry registration date, if present.
    #[must_use]
    pub fn registration_date(&self) -> Option<&str> {
        self.registration_date.as_deref()
    }

    /// Get the publication date.
    #[must_use]
    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    /// Get the journal impact-factor quartile, if known.
    #[must_use]
    pub const fn impact_factor_quartile(&self) -> Option<ImpactQuartile> {
        self.impact_factor_quartile
    }
}

/// Exchange-format shape of a record before validation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrialRecord {
    id: String,
    journal_name: String,
    #[serde(rename = "isICMJEMember")]
    is_icmje_member: bool,
    #[serde(rename = "hasTRN")]
    has_trn: bool,
    #[serde(default)]
    trn: Option<String>,
    #[serde(default)]
    enrollment_date: Option<String>,
    #[serde(default)]
    registration_date: Option<String>,
    publication_date: String,
    #[serde(default)]
    impact_factor_quartile: Option<ImpactQuartile>,
}

impl TryFrom<RawTrialRecord> for TrialRecord {
    type Error = Error;

    fn try_from(raw: RawTrialRecord) -> Result<Self> {
        let mut builder = Self::builder(raw.id, raw.journal_name, raw.publication_date)
            .icmje_member(raw.is_icmje_member);
        if let Some(trn) = raw.trn {
            builder = builder.trn(trn);
        }
        // the explicit flag wins over the TRN value so a contradiction is rejected
        builder = builder.has_trn(raw.has_trn);
        if let Some(date) = raw.enrollment_date {
            builder = builder.enrollment_date(date);
        }
        if let Some(date) = raw.registration_date {
            builder = builder.registration_date(date);
        }
        if let Some(quartile) = raw.impact_factor_quartile {
            builder = builder.impact_factor_quartile(quartile);
        }
        builder.build()
    }
}

/// Builder for `TrialRecord`.
#[derive(Debug)]
pub struct TrialRecordBuilder {
    id: String,
    journal_name: String,
    is_icmje_member: bool,
    has_trn: bool,
    trn: Option<String>,
    enrollment_date: Option<String>,
    registration_date: Option<String>,
    publication_date: String,
    impact_factor_quartile: Option<ImpactQuartile>,
}

impl TrialRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        journal_name: impl Into<String>,
        publication_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            journal_name: journal_name.into(),
            is_icmje_member: false,
            has_trn: false,
            trn: None,
            enrollment_date: None,
            registration_date: None,
            publication_date: publication_date.into(),
            impact_factor_quartile: None,
        }
    }

    /// Mark the publishing journal as an ICMJE member (or not).
    #[must_use]
    pub const fn icmje_member(mut self, member: bool) -> Self {
        self.is_icmje_member = member;
        self
    }

    /// Set whether a TRN was reported without recording its value.
    #[must_use]
    pub const fn has_trn(mut self, has_trn: bool) -> Self {
        self.has_trn = has_trn;
        self
    }

    /// Record the reported TRN. Implies `has_trn(true)`.
    ///
    /// A blank TRN is ignored.
    #[must_use]
    pub fn trn(mut self, trn: impl Into<String>) -> Self {
        if let Some(trn) = non_blank(trn.into()) {
            self.has_trn = true;
            self.trn = Some(trn);
        }
        self
    }

    /// Set the enrollment start date (`YYYY-MM-DD`). Blank text leaves it unset.
    #[must_use]
    pub fn enrollment_date(mut self, date: impl Into<String>) -> Self {
        self.enrollment_date = non_blank(date.into());
        self
    }

    /// Set the registry registration date (`YYYY-MM-DD`). Blank text leaves it unset.
    #[must_use]
    pub fn registration_date(mut self, date: impl Into<String>) -> Self {
        self.registration_date = non_blank(date.into());
        self
    }

    /// Set the journal impact-factor quartile.
    #[must_use]
    pub const fn impact_factor_quartile(mut self, quartile: ImpactQuartile) -> Self {
        self.impact_factor_quartile = Some(quartile);
        self
    }

    /// Build the `TrialRecord`.
    ///
    /// Enrollment and registration dates are not validated here; unparsable
    /// dates are excluded from timing classification by the metrics engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if a TRN value is set while
    /// `has_trn` is false, or if the publication date is not `YYYY-MM-DD`.
    pub fn build(self) -> Result<TrialRecord> {
        if !self.has_trn && self.trn.is_some() {
            return Err(Error::InvalidRecord {
                id: self.id,
                reason: "TRN value present but hasTRN is false".to_string(),
            });
        }

        if parse_date(&self.publication_date).is_err() {
            return Err(Error::InvalidRecord {
                reason: format!("publication date '{}' is not YYYY-MM-DD", self.publication_date),
                id: self.id,
            });
        }

        Ok(TrialRecord {
            id: self.id,
            journal_name: self.journal_name,
            is_icmje_member: self.is_icmje_member,
            has_trn: self.has_trn,
            trn: self.trn,
            enrollment_date: self.enrollment_date,
            registration_date: self.registration_date,
            publication_date: self.publication_date,
            impact_factor_quartile: self.impact_factor_quartile,
        })
    }
}

fn non_blank(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}
