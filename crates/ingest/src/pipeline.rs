//! Upload → normalize → store.
//!
//! Each batch runs inside one store session. Rows are resolved against the
//! dimension tables and inserted one at a time; a row the store rejects is
//! counted and skipped, never retried.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use timesheet_core::config::IngestConfig;
use timesheet_core::{Dimension, NewRecord, RawTable, TimeRecord};
use timesheet_storage::{SqliteStore, StoreSession, StorageError};
use tracing::info;

use crate::error::IngestError;
use crate::normalize::{NormalizedBatch, Normalizer};
use crate::upload::UploadFormat;

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Data rows in the upload.
    pub total_rows: usize,
    /// Rows dropped by the normalizer for missing essentials.
    pub dropped_rows: usize,
    /// Rows written to the store.
    pub inserted: usize,
    /// Rows the store refused (constraint violations).
    pub failed: usize,
}

pub struct IngestPipeline {
    store: SqliteStore,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(store: SqliteStore, config: IngestConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Read and normalize an upload without touching the store.
    pub fn preview_file(
        &self,
        path: &Path,
        format: Option<UploadFormat>,
    ) -> Result<NormalizedBatch, IngestError> {
        let table = self.read_file(path, format)?;
        Ok(Normalizer::normalize(&table)?)
    }

    /// Read, normalize and store an upload.
    pub fn ingest_file(
        &self,
        path: &Path,
        format: Option<UploadFormat>,
    ) -> Result<IngestReport, IngestError> {
        let table = self.read_file(path, format)?;
        let report = self.ingest_table(&table)?;
        info!(
            "Ingested {}: {} inserted, {} dropped, {} failed",
            path.display(),
            report.inserted,
            report.dropped_rows,
            report.failed
        );
        Ok(report)
    }

    /// Normalize a raw table and store the surviving rows. A missing column
    /// fails before anything is written.
    pub fn ingest_table(&self, table: &RawTable) -> Result<IngestReport, IngestError> {
        let batch = Normalizer::normalize(table)?;
        self.ingest_batch(&batch)
    }

    /// Store an already normalized batch (e.g. after the user confirmed a
    /// preview).
    pub fn ingest_batch(&self, batch: &NormalizedBatch) -> Result<IngestReport, IngestError> {
        let start = Instant::now();
        let (inserted, failed) = self
            .store
            .with_session(|session| insert_records(session, &batch.records))?;

        let report = IngestReport {
            total_rows: batch.total_rows,
            dropped_rows: batch.dropped_rows,
            inserted,
            failed,
        };
        info!(
            inserted = report.inserted,
            failed = report.failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch stored"
        );
        Ok(report)
    }

    fn read_file(
        &self,
        path: &Path,
        format: Option<UploadFormat>,
    ) -> Result<RawTable, IngestError> {
        let format = match format {
            Some(f) => f,
            None => UploadFormat::from_path(path)?,
        };
        format.read(path, self.config.csv_delimiter)
    }
}

/// Resolve dimension ids and insert each record. Returns
/// `(inserted, failed)`; only errors other than constraint violations abort.
pub fn insert_records(
    session: &StoreSession,
    records: &[TimeRecord],
) -> Result<(usize, usize), StorageError> {
    let mut inserted = 0;
    let mut failed = 0;

    for record in records {
        let mut ids = [0; 3];
        for (id, dimension) in ids.iter_mut().zip(Dimension::ALL) {
            *id = session.lookup_or_insert(dimension, record.name_for(dimension))?;
        }
        let [technician_id, client_id, task_type_id] = ids;

        let row = NewRecord::from_record(record, technician_id, client_id, task_type_id);
        if session.insert_record(&row)? {
            inserted += 1;
        } else {
            failed += 1;
        }
    }

    Ok((inserted, failed))
}
