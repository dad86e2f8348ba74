//! Sharded on-disk report store.
//!
//! ## Storage Layout
//!
//! ```text
//! reports/
//!   <s1>/
//!     <s2>/
//!       <id>/
//!         report.json
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the report id. The record directory
//! is the unit of existence: it is created exclusively on insert and removed as a whole on
//! delete.
//!
//! `report.json` is written to a temporary file and renamed into place, so a reader never sees a
//! half-written record.

use super::{ReportStore, StoreError, StoreResult};
use crate::constants::{REPORT_JSON_FILENAME, REPORT_JSON_TMP_FILENAME};
use crate::report::Report;
use mw_uuid::ReportId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct FileReportStore {
    reports_dir: PathBuf,
}

impl FileReportStore {
    /// Open (creating if needed) a store rooted at `reports_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DirCreation`] if the directory cannot be created.
    pub fn open(reports_dir: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&reports_dir).map_err(StoreError::DirCreation)?;
        Ok(Self { reports_dir })
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    fn record_dir(&self, id: &ReportId) -> PathBuf {
        id.sharded_dir(&self.reports_dir)
    }

    fn write_record(record_dir: &Path, report: &Report) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(report).map_err(StoreError::Serialization)?;
        let tmp_path = record_dir.join(REPORT_JSON_TMP_FILENAME);
        fs::write(&tmp_path, json).map_err(StoreError::FileWrite)?;
        fs::rename(&tmp_path, record_dir.join(REPORT_JSON_FILENAME))
            .map_err(StoreError::FileWrite)
    }

    fn read_record(path: &Path) -> StoreResult<Report> {
        let contents = fs::read_to_string(path).map_err(StoreError::FileRead)?;
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)
    }
}

impl ReportStore for FileReportStore {
    fn insert(&self, report: &Report) -> StoreResult<()> {
        let record_dir = self.record_dir(&report.id);

        if let Some(parent) = record_dir.parent() {
            fs::create_dir_all(parent).map_err(StoreError::DirCreation)?;
        }

        match fs::create_dir(&record_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::Duplicate(report.id));
            }
            Err(e) => return Err(StoreError::DirCreation(e)),
        }

        if let Err(write_error) = Self::write_record(&record_dir, report) {
            if let Err(cleanup_error) = fs::remove_dir_all(&record_dir) {
                tracing::warn!(
                    "failed to clean up partial report {}: {}",
                    record_dir.display(),
                    cleanup_error
                );
            }
            return Err(write_error);
        }

        Ok(())
    }

    fn get(&self, id: &ReportId) -> StoreResult<Option<Report>> {
        let path = self.record_dir(id).join(REPORT_JSON_FILENAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    /// Traverses `<reports_dir>/<s1>/<s2>/<id>/report.json`.
    ///
    /// Records that cannot be read or parsed are logged and skipped so one damaged file does not
    /// hide the rest.
    fn list(&self) -> StoreResult<Vec<Report>> {
        let mut reports = Vec::new();

        let s1_iter = match fs::read_dir(&self.reports_dir) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(reports),
            Err(e) => return Err(StoreError::FileRead(e)),
        };

        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };

                for id_ent in id_iter.flatten() {
                    let report_path = id_ent.path().join(REPORT_JSON_FILENAME);
                    if !report_path.is_file() {
                        continue;
                    }

                    match Self::read_record(&report_path) {
                        Ok(report) => reports.push(report),
                        Err(e) => {
                            tracing::warn!(
                                "failed to load report: {} - {}",
                                report_path.display(),
                                e
                            );
                        }
                    }
                }
            }
        }

        Ok(reports)
    }

    fn delete(&self, id: &ReportId) -> StoreResult<bool> {
        let record_dir = self.record_dir(id);
        match fs::remove_dir_all(&record_dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::FileDelete(e)),
        }
    }
}
