//! Table of downloads accepted by the host and not yet finished.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::host::{DownloadId, ResourceHandle};

/// A download the host accepted, with the resource it reads from.
#[derive(Debug)]
pub struct PendingDownload {
    pub download_id: DownloadId,
    pub resource: ResourceHandle,
    pub is_backup: bool,
}

/// Copy of a pending record for logging and inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSnapshot {
    pub download_id: DownloadId,
    pub url: String,
    pub is_backup: bool,
}

impl From<&PendingDownload> for PendingSnapshot {
    fn from(record: &PendingDownload) -> Self {
        Self {
            download_id: record.download_id,
            url: record.resource.url().to_string(),
            is_backup: record.is_backup,
        }
    }
}

/// Pending downloads keyed by download id.
///
/// The lock is only taken inside `insert`, `lookup` and `remove`, never
/// across an await point.
#[derive(Debug, Default)]
pub struct PendingTable {
    records: Mutex<HashMap<DownloadId, PendingDownload>>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<DownloadId, PendingDownload>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record, returning any record previously stored under the same id.
    pub fn insert(&self, record: PendingDownload) -> Option<PendingDownload> {
        self.records().insert(record.download_id, record)
    }

    pub fn lookup(&self, id: DownloadId) -> Option<PendingSnapshot> {
        self.records().get(&id).map(PendingSnapshot::from)
    }

    pub fn remove(&self, id: DownloadId) -> Option<PendingDownload> {
        self.records().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}
