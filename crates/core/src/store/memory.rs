use super::{ReportStore, StoreError, StoreResult};
use crate::report::Report;
use mw_uuid::ReportId;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory report store.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: RwLock<HashMap<ReportId, Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for MemoryReportStore {
    fn insert(&self, report: &Report) -> StoreResult<()> {
        let mut reports = self.reports.write().unwrap_or_else(|e| e.into_inner());
        if reports.contains_key(&report.id) {
            return Err(StoreError::Duplicate(report.id));
        }
        reports.insert(report.id, report.clone());
        Ok(())
    }

    fn get(&self, id: &ReportId) -> StoreResult<Option<Report>> {
        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(reports.get(id).cloned())
    }

    fn list(&self) -> StoreResult<Vec<Report>> {
        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(reports.values().cloned().collect())
    }

    fn delete(&self, id: &ReportId) -> StoreResult<bool> {
        let mut reports = self.reports.write().unwrap_or_else(|e| e.into_inner());
        Ok(reports.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(title: &str) -> Report {
        Report::new(title.into(), "t".into(), "{}".into(), "{}".into())
    }

    #[test]
    fn insert_get_delete() {
        let store = MemoryReportStore::new();
        let r = report("A");

        store.insert(&r).unwrap();
        assert_eq!(store.get(&r.id).unwrap(), Some(r.clone()));
        assert!(store.delete(&r.id).unwrap());
        assert_eq!(store.get(&r.id).unwrap(), None);
        assert!(!store.delete(&r.id).unwrap());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = MemoryReportStore::new();
        let r = report("A");
        store.insert(&r).unwrap();
        assert!(matches!(store.insert(&r), Err(StoreError::Duplicate(id)) if id == r.id));
    }
}
