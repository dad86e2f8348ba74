//! Report persistence boundary.
//!
//! A store is a document collection keyed by [`ReportId`]. Two backends are provided:
//! * [`FileReportStore`]: one JSON file per report in a sharded directory tree.
//! * [`MemoryReportStore`]: a process-local map, for tests and throwaway runs.
//!
//! Writes are all-or-nothing per report; there are no cross-record transactions.

mod file;
mod memory;

pub use file::FileReportStore;
pub use memory::MemoryReportStore;

use crate::config::{CoreConfig, StoreKind};
use crate::report::Report;
use mw_uuid::ReportId;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create storage directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to write report file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read report file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to delete report: {0}")]
    FileDelete(std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize report: {0}")]
    Deserialization(serde_json::Error),
    #[error("report {0} already exists")]
    Duplicate(ReportId),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-based report storage.
///
/// Implementations must be safe to share between request handlers.
pub trait ReportStore: Send + Sync {
    /// Durably store a new report. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn insert(&self, report: &Report) -> StoreResult<()>;

    /// Fetch a report by id.
    fn get(&self, id: &ReportId) -> StoreResult<Option<Report>>;

    /// Every stored report, in no particular order.
    fn list(&self) -> StoreResult<Vec<Report>>;

    /// Hard-delete a report. Returns `false` if nothing was stored under `id`.
    fn delete(&self, id: &ReportId) -> StoreResult<bool>;
}

/// Open the backend selected by `cfg`.
///
/// # Errors
///
/// Returns [`StoreError::DirCreation`] if the file store's directory cannot be created.
pub fn open_store(cfg: &CoreConfig) -> StoreResult<Arc<dyn ReportStore>> {
    match cfg.store_kind() {
        StoreKind::File => Ok(Arc::new(FileReportStore::open(cfg.reports_dir())?)),
        StoreKind::Memory => Ok(Arc::new(MemoryReportStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_store_creates_reports_dir_for_file_backend() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(temp_dir.path().join("data"), StoreKind::File).unwrap();

        let store = open_store(&cfg).unwrap();

        assert!(cfg.reports_dir().is_dir());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn open_store_memory_backend_touches_no_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(temp_dir.path().join("data"), StoreKind::Memory).unwrap();

        let _store = open_store(&cfg).unwrap();

        assert!(!cfg.report_data_dir().exists());
    }
}
