//! Record source: trial record tables (Arrow/Parquet) and JSON exchange
//!
//! Uploaded study data is tabular, one row per published trial, with the
//! columns `Journal Name`, `Publication Date`, `ICMJE Member`,
//! `Trial Registration Number`, `Enrollment Date` and `Registration Date`.
//! [`RecordTable`] loads such tables from CSV uploads or Parquet files, holds
//! them as Arrow batches and converts them to [`TrialRecord`]s for the
//! metrics engine.
//!
//! **Append-only**: tables are loaded and appended in bulk; metrics are
//! recomputed from the full record set every time, so rows are never edited
//! in place.

mod json;
mod schema;

pub use json::{from_json_str, load_json, to_json_string};
pub use schema::{
    from_record_batch, record_schema, to_record_batch, upload_schema, COL_ENROLLMENT_DATE, COL_HAS_TRN,
    COL_ICMJE_MEMBER, COL_ID, COL_JOURNAL, COL_PUBLICATION_DATE, COL_QUARTILE,
    COL_REGISTRATION_DATE, COL_TRN,
};

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use tracing::debug;

use crate::record::TrialRecord;
use crate::{Error, Result};

/// Trial record table backed by Arrow record batches
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    batches: Vec<RecordBatch>,
}

impl RecordTable {
    /// Create a table from existing batches
    ///
    /// Useful for testing and for tables built in memory
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Build a single-batch table from records
    ///
    /// # Errors
    /// Returns error if the batch cannot be assembled
    pub fn from_records(records: &[TrialRecord]) -> Result<Self> {
        Ok(Self::new(vec![to_record_batch(records)?]))
    }

    /// Load table from Parquet file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file: {e}"))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        debug!(path = %path.as_ref().display(), batches = batches.len(), "loaded record table");
        Ok(Self { batches })
    }

    /// Load table from an uploaded CSV file
    ///
    /// The first line is the header. Column order is free; see
    /// [`upload_schema`] for how cells are typed.
    ///
    /// # Errors
    /// Returns error if file cannot be read or a cell does not parse
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::StorageError(format!("Failed to open CSV file: {e}"))
        })?;

        let table = Self::from_csv_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            rows = table.num_rows(),
            "loaded CSV record table"
        );
        Ok(table)
    }

    /// Read a CSV upload (header row first) from any seekable source
    ///
    /// # Errors
    /// Returns error if the header is missing or a cell does not parse
    pub fn from_csv_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let (header, _) = Format::default()
            .with_header(true)
            .infer_schema(&mut reader, Some(0))
            .map_err(|e| Error::StorageError(format!("Failed to read CSV header: {e}")))?;
        reader.rewind()?;

        let csv = ReaderBuilder::new(Arc::new(upload_schema(&header)))
            .with_header(true)
            .build(reader)
            .map_err(|e| Error::StorageError(format!("Failed to create CSV reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in csv {
            let batch = batch
                .map_err(|e| Error::StorageError(format!("Failed to parse CSV rows: {e}")))?;
            batches.push(batch);
        }

        Ok(Self { batches })
    }

    /// Write all batches to a Parquet file
    ///
    /// # Errors
    /// Returns error if the table is empty or the file cannot be written
    pub fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let Some(first) = self.batches.first() else {
            return Err(Error::StorageError(
                "Cannot write an empty record table".to_string(),
            ));
        };

        let file = File::create(path.as_ref())?;
        let mut writer = ArrowWriter::try_new(file, first.schema(), None).map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet writer: {e}"))
        })?;
        for batch in &self.batches {
            writer.write(batch).map_err(|e| {
                Error::StorageError(format!("Failed to write record batch: {e}"))
            })?;
        }
        writer.close().map_err(|e| {
            Error::StorageError(format!("Failed to finish Parquet file: {e}"))
        })?;

        Ok(())
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across all batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Append a batch (bulk load)
    ///
    /// # Errors
    ///
    /// Returns error if batch schema doesn't match existing batches
    pub fn append_batch(&mut self, batch: RecordBatch) -> Result<()> {
        if let Some(existing) = self.batches.first() {
            let existing_schema = existing.schema();
            if batch.schema() != existing_schema {
                return Err(Error::StorageError(format!(
                    "Schema mismatch: expected {:?}, got {:?}",
                    existing_schema,
                    batch.schema()
                )));
            }
        }

        self.batches.push(batch);
        Ok(())
    }

    /// Convert every row into a [`TrialRecord`]
    ///
    /// Rows without an `ID` column value are numbered `ROW-1`, `ROW-2`, ...
    /// across the whole table.
    ///
    /// # Errors
    /// Returns error if a batch lacks a required column or a row is invalid
    pub fn records(&self) -> Result<Vec<TrialRecord>> {
        let mut records = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let offset = records.len();
            records.extend(from_record_batch(batch, offset)?);
        }
        Ok(records)
    }
}
