//! Arrow schema for trial record tables and row conversion

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, RecordBatch, StringArray, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

use crate::record::{ImpactQuartile, TrialRecord};
use crate::{Error, Result};

/// Optional record identifier column (rows are numbered when absent).
pub const COL_ID: &str = "ID";
/// Journal name column.
pub const COL_JOURNAL: &str = "Journal Name";
/// Publication date column (`YYYY-MM-DD`).
pub const COL_PUBLICATION_DATE: &str = "Publication Date";
/// ICMJE membership column.
pub const COL_ICMJE_MEMBER: &str = "ICMJE Member";
/// Trial Registration Number column; empty or null means none reported.
pub const COL_TRN: &str = "Trial Registration Number";
/// Optional explicit TRN-reported flag (for a TRN reported without its value).
pub const COL_HAS_TRN: &str = "Has TRN";
/// Enrollment start date column (`YYYY-MM-DD`).
pub const COL_ENROLLMENT_DATE: &str = "Enrollment Date";
/// Registration date column (`YYYY-MM-DD`).
pub const COL_REGISTRATION_DATE: &str = "Registration Date";
/// Optional impact-factor quartile column (1-4).
pub const COL_QUARTILE: &str = "Impact Factor Quartile";

/// Schema written by [`to_record_batch`].
///
/// Dates are kept as text so malformed source values survive into the
/// metrics engine, which excludes them from timing classification.
#[must_use]
pub fn record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(COL_ID, DataType::Utf8, false),
        Field::new(COL_JOURNAL, DataType::Utf8, false),
        Field::new(COL_PUBLICATION_DATE, DataType::Utf8, false),
        Field::new(COL_ICMJE_MEMBER, DataType::Boolean, false),
        Field::new(COL_TRN, DataType::Utf8, true),
        Field::new(COL_HAS_TRN, DataType::Boolean, false),
        Field::new(COL_ENROLLMENT_DATE, DataType::Utf8, true),
        Field::new(COL_REGISTRATION_DATE, DataType::Utf8, true),
        Field::new(COL_QUARTILE, DataType::UInt8, true),
    ]))
}

/// Schema for reading an uploaded CSV file with the given header row.
///
/// Flag columns are read as booleans (`True`/`False` in any case), the
/// quartile as `UInt8`, everything else as text. Every field is nullable so
/// blank cells load as absent values, and header names are trimmed.
#[must_use]
pub fn upload_schema(header: &Schema) -> Schema {
    let fields: Vec<Field> = header
        .fields()
        .iter()
        .map(|field| {
            let name = field.name().trim();
            let data_type = match name {
                COL_ICMJE_MEMBER | COL_HAS_TRN => DataType::Boolean,
                COL_QUARTILE => DataType::UInt8,
                _ => DataType::Utf8,
            };
            Field::new(name, data_type, true)
        })
        .collect();
    Schema::new(fields)
}

/// Convert records into a single Arrow batch.
///
/// # Errors
///
/// Returns error if Arrow rejects the assembled columns.
pub fn to_record_batch(records: &[TrialRecord]) -> Result<RecordBatch> {
    let ids = StringArray::from_iter_values(records.iter().map(TrialRecord::id));
    let journals = StringArray::from_iter_values(records.iter().map(TrialRecord::journal_name));
    let publication =
        StringArray::from_iter_values(records.iter().map(TrialRecord::publication_date));
    let icmje: BooleanArray = records.iter().map(|r| Some(r.is_icmje_member())).collect();
    let trns: StringArray = records.iter().map(TrialRecord::trn).collect();
    let has_trn: BooleanArray = records.iter().map(|r| Some(r.has_trn())).collect();
    let enrollment: StringArray = records.iter().map(TrialRecord::enrollment_date).collect();
    let registration: StringArray = records.iter().map(TrialRecord::registration_date).collect();
    let quartiles: UInt8Array = records
        .iter()
        .map(|r| r.impact_factor_quartile().map(ImpactQuartile::ordinal))
        .collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(ids),
        Arc::new(journals),
        Arc::new(publication),
        Arc::new(icmje),
        Arc::new(trns),
        Arc::new(has_trn),
        Arc::new(enrollment),
        Arc::new(registration),
        Arc::new(quartiles),
    ];

    Ok(RecordBatch::try_new(record_schema(), columns)?)
}

/// Convert an Arrow batch into records.
///
/// Only the six tabular columns are required (`Journal Name`,
/// `Publication Date`, `ICMJE Member`, `Trial Registration Number`,
/// `Enrollment Date`, `Registration Date`). `ID`, `Has TRN` and
/// `Impact Factor Quartile` are read when present. `row_offset` numbers
/// generated IDs across multiple batches.
///
/// # Errors
///
/// Returns [`Error::StorageError`] if a required column is missing, has the
/// wrong type, or a row violates a record invariant.
pub fn from_record_batch(batch: &RecordBatch, row_offset: usize) -> Result<Vec<TrialRecord>> {
    let journals = required_strings(batch, COL_JOURNAL)?;
    let publication = required_strings(batch, COL_PUBLICATION_DATE)?;
    let icmje = required_booleans(batch, COL_ICMJE_MEMBER)?;
    let trns = required_strings(batch, COL_TRN)?;
    let enrollment = required_strings(batch, COL_ENROLLMENT_DATE)?;
    let registration = required_strings(batch, COL_REGISTRATION_DATE)?;

    let ids = optional_column::<StringArray>(batch, COL_ID)?;
    let has_trn_flags = optional_column::<BooleanArray>(batch, COL_HAS_TRN)?;
    let quartiles = optional_column::<UInt8Array>(batch, COL_QUARTILE)?;

    let mut records = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let id = ids
            .and_then(|col| cell(col, row))
            .map_or_else(|| format!("ROW-{}", row_offset + row + 1), str::to_string);

        let journal = cell(journals, row).ok_or_else(|| {
            Error::StorageError(format!("row {}: '{COL_JOURNAL}' is empty", row_offset + row + 1))
        })?;
        let published = cell(publication, row).ok_or_else(|| {
            Error::StorageError(format!(
                "row {}: '{COL_PUBLICATION_DATE}' is empty",
                row_offset + row + 1
            ))
        })?;

        let trn = cell(trns, row);
        let has_trn = has_trn_flags
            .filter(|col| col.is_valid(row))
            .map_or(trn.is_some(), |col| col.value(row));

        let mut builder = TrialRecord::builder(id, journal, published)
            .icmje_member(icmje.is_valid(row) && icmje.value(row));
        if let Some(trn) = trn {
            builder = builder.trn(trn);
        }
        // an explicit false flag next to a TRN value is rejected by build()
        builder = builder.has_trn(has_trn);
        if let Some(date) = cell(enrollment, row) {
            builder = builder.enrollment_date(date);
        }
        if let Some(date) = cell(registration, row) {
            builder = builder.registration_date(date);
        }
        if let Some(col) = quartiles.filter(|col| col.is_valid(row)) {
            let quartile = ImpactQuartile::try_from(col.value(row))
                .map_err(|e| Error::StorageError(format!("row {}: {e}", row_offset + row + 1)))?;
            builder = builder.impact_factor_quartile(quartile);
        }

        let record = builder
            .build()
            .map_err(|e| Error::StorageError(format!("row {}: {e}", row_offset + row + 1)))?;
        records.push(record);
    }

    Ok(records)
}

/// Non-empty trimmed text cell, `None` for null or blank.
fn cell(array: &StringArray, row: usize) -> Option<&str> {
    if array.is_null(row) {
        return None;
    }
    let value = array.value(row).trim();
    (!value.is_empty()).then_some(value)
}

fn required_strings<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    optional_column::<StringArray>(batch, name)?
        .ok_or_else(|| Error::StorageError(format!("Missing required column '{name}'")))
}

fn required_booleans<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a BooleanArray> {
    optional_column::<BooleanArray>(batch, name)?
        .ok_or_else(|| Error::StorageError(format!("Missing required column '{name}'")))
}

fn optional_column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<Option<&'a T>> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    column
        .as_any()
        .downcast_ref::<T>()
        .map(Some)
        .ok_or_else(|| {
            Error::StorageError(format!(
                "Column '{name}' has unexpected type {:?}",
                column.data_type()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TrialRecord> {
        vec![
            TrialRecord::builder("PMID-1", "JAMA", "2018-06-15")
                .icmje_member(true)
                .trn("NCT01")
                .enrollment_date("2016-01-01")
                .registration_date("2015-12-01")
                .impact_factor_quartile(ImpactQuartile::Q1)
                .build()
                .unwrap(),
            TrialRecord::builder("PMID-2", "General Medical Journal", "2018-07-01")
                .build()
                .unwrap(),
            TrialRecord::builder("PMID-3", "General Medical Journal", "2018-08-01")
                .has_trn(true)
                .build()
                .unwrap(),
        ]
    }

    #[test]
    fn test_batch_preserves_records() {
        let records = sample();
        let batch = to_record_batch(&records).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(from_record_batch(&batch, 0).unwrap(), records);
    }

    #[test]
    fn test_minimal_six_column_table() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_JOURNAL, DataType::Utf8, false),
            Field::new(COL_PUBLICATION_DATE, DataType::Utf8, false),
            Field::new(COL_ICMJE_MEMBER, DataType::Boolean, true),
            Field::new(COL_TRN, DataType::Utf8, true),
            Field::new(COL_ENROLLMENT_DATE, DataType::Utf8, true),
            Field::new(COL_REGISTRATION_DATE, DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["JAMA", "BMJ"])),
                Arc::new(StringArray::from(vec!["2018-06-15", "2018-07-15"])),
                Arc::new(BooleanArray::from(vec![Some(true), None])),
                Arc::new(StringArray::from(vec![Some("NCT0123"), Some("  ")])),
                Arc::new(StringArray::from(vec![Some("2018-01-01"), None])),
                Arc::new(StringArray::from(vec![Some("2018-02-01"), None])),
            ],
        )
        .unwrap();

        let records = from_record_batch(&batch, 10).unwrap();
        assert_eq!(records[0].id(), "ROW-11");
        assert_eq!(records[1].id(), "ROW-12");
        assert!(records[0].has_trn());
        assert!(records[0].is_icmje_member());
        assert!(!records[1].has_trn());
        assert!(!records[1].is_icmje_member());
        assert_eq!(records[1].trn(), None);
    }

    #[test]
    fn test_missing_required_column() {
        let schema = Arc::new(Schema::new(vec![Field::new(COL_JOURNAL, DataType::Utf8, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["JAMA"]))]).unwrap();
        let err = from_record_batch(&batch, 0).unwrap_err();
        assert!(err.to_string().contains(COL_PUBLICATION_DATE));
    }

    #[test]
    fn test_wrong_column_type() {
        let schema = Arc::new(Schema::new(vec![Field::new(COL_JOURNAL, DataType::UInt8, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(UInt8Array::from(vec![1u8]))]).unwrap();
        let err = from_record_batch(&batch, 0).unwrap_err();
        assert!(err.to_string().contains("unexpected type"));
    }
}
