//! Download lifecycle tracking.
//!
//! Every accepted download gets a [`PendingTable`] entry holding its resource.
//! The entry is removed and the resource released when the host reports the
//! download complete or `FILE_FAILED`; a rejected submission releases the
//! resource straight away and never creates an entry.

use std::sync::Arc;

use crate::error::SubmissionError;
use crate::host::{
    ConflictAction, DownloadDelta, DownloadHost, DownloadId, DownloadRequest, DownloadStatus,
};
use crate::payload::ExportPayload;
use crate::pending::{PendingDownload, PendingTable};

/// Result of submitting a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted and tracked under this id
    Pending(DownloadId),
    /// Refused by the host; the resource was already released
    Rejected(SubmissionError),
}

pub struct DownloadTracker {
    host: Arc<dyn DownloadHost>,
    table: PendingTable,
}

impl DownloadTracker {
    pub fn new(host: Arc<dyn DownloadHost>) -> Self {
        Self {
            host,
            table: PendingTable::new(),
        }
    }

    pub fn pending(&self) -> &PendingTable {
        &self.table
    }

    /// Create the payload resource and submit it to the host.
    ///
    /// Backups overwrite silently; normal exports prompt for a location and
    /// let the host uniquify the name.
    pub async fn submit(&self, payload: &ExportPayload, is_backup: bool) -> SubmitOutcome {
        let resource = self.host.create_resource(payload);
        let request = DownloadRequest {
            url: resource.url().to_string(),
            filename: payload.path.download_filename(),
            conflict_action: ConflictAction::for_export(is_backup),
            save_as: !is_backup,
        };

        match self.host.submit_download(request).await {
            Ok(download_id) => {
                log::debug!(
                    "Download {} accepted by {} (backup: {})",
                    download_id,
                    self.host.name(),
                    is_backup
                );
                let record = PendingDownload {
                    download_id,
                    resource,
                    is_backup,
                };
                if let Some(displaced) = self.table.insert(record) {
                    log::warn!(
                        "Download id {} reused while still pending, releasing {}",
                        download_id,
                        displaced.resource.url()
                    );
                    self.host.release_resource(displaced.resource);
                }
                SubmitOutcome::Pending(download_id)
            }
            Err(err) => {
                log::warn!("Download rejected by {}: {}", self.host.name(), err);
                self.host.release_resource(resource);
                SubmitOutcome::Rejected(err)
            }
        }
    }

    /// Handle a status notification from the host.
    ///
    /// Returns `true` when the notification finished a tracked download.
    /// Notifications for unknown ids (downloads started elsewhere or already
    /// released) are ignored.
    pub fn handle_downloads_changed(&self, delta: &DownloadDelta) -> bool {
        let Some(snapshot) = self.table.lookup(delta.id) else {
            return false;
        };

        match delta.status() {
            DownloadStatus::Complete => {
                log::debug!("Download {} complete", delta.id);
                self.release(delta.id)
            }
            DownloadStatus::Failed => {
                log::error!("Download failed: {:?} {:?}", delta, snapshot);
                self.release(delta.id)
            }
            DownloadStatus::Other => false,
        }
    }

    fn release(&self, download_id: DownloadId) -> bool {
        let Some(record) = self.table.remove(download_id) else {
            return false;
        };

        if record.is_backup {
            self.host.erase_download_record(download_id);
        }
        self.host.release_resource(record.resource);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ERROR_FILE_FAILED, MockHost};
    use crate::naming::SanitizedPath;

    fn payload() -> ExportPayload {
        ExportPayload {
            json: "[]".to_string(),
            path: SanitizedPath {
                folder_prefix: "Backups/".to_string(),
                file_name: "Trip".to_string(),
            },
        }
    }

    fn tracker(host: &Arc<MockHost>) -> DownloadTracker {
        DownloadTracker::new(host.clone())
    }

    #[tokio::test]
    async fn test_submit_normal_export() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);

        let outcome = tracker.submit(&payload(), false).await;
        assert_eq!(outcome, SubmitOutcome::Pending(DownloadId(1)));
        assert_eq!(tracker.pending().len(), 1);

        let requests = host.requests();
        let request = &requests[0];
        assert_eq!(request.filename, "Backups/Trip.json");
        assert_eq!(request.conflict_action, ConflictAction::Uniquify);
        assert!(request.save_as);
        assert_eq!(request.url, "blob:mock/0");
    }

    #[tokio::test]
    async fn test_submit_backup_export() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);

        tracker.submit(&payload(), true).await;
        let requests = host.requests();
        let request = &requests[0];
        assert_eq!(request.conflict_action, ConflictAction::Overwrite);
        assert!(!request.save_as);
        assert!(tracker.pending().lookup(DownloadId(1)).unwrap().is_backup);
    }

    #[tokio::test]
    async fn test_rejected_submission_releases_immediately() {
        let host = Arc::new(MockHost::rejects_with(SubmissionError::Cancelled));
        let tracker = tracker(&host);

        let outcome = tracker.submit(&payload(), false).await;
        assert_eq!(outcome, SubmitOutcome::Rejected(SubmissionError::Cancelled));
        assert!(tracker.pending().is_empty());
        assert_eq!(host.created_count(), 1);
        assert_eq!(host.release_count(), 1);
    }

    #[tokio::test]
    async fn test_complete_releases_once() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        tracker.submit(&payload(), false).await;

        let delta = DownloadDelta::complete(DownloadId(1));
        assert!(tracker.handle_downloads_changed(&delta));
        assert!(tracker.pending().lookup(DownloadId(1)).is_none());
        assert_eq!(host.release_count(), 1);

        // Repeated terminal notifications are no-ops
        assert!(!tracker.handle_downloads_changed(&delta));
        assert_eq!(host.release_count(), 1);
        assert!(host.erased_ids().is_empty());
    }

    #[tokio::test]
    async fn test_backup_complete_erases_record() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        tracker.submit(&payload(), true).await;

        tracker.handle_downloads_changed(&DownloadDelta::complete(DownloadId(1)));
        assert_eq!(host.erased_ids(), vec![DownloadId(1)]);
        assert_eq!(host.release_count(), 1);
    }

    #[tokio::test]
    async fn test_file_failed_backup_erases_record() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        tracker.submit(&payload(), true).await;

        let delta = DownloadDelta::failed(DownloadId(1), ERROR_FILE_FAILED);
        assert!(tracker.handle_downloads_changed(&delta));
        assert_eq!(host.erased_ids(), vec![DownloadId(1)]);
        assert_eq!(host.release_count(), 1);
        assert!(tracker.pending().is_empty());
    }

    #[tokio::test]
    async fn test_file_failed_normal_export_skips_erase() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        tracker.submit(&payload(), false).await;

        let delta = DownloadDelta::failed(DownloadId(1), ERROR_FILE_FAILED);
        assert!(tracker.handle_downloads_changed(&delta));
        assert!(host.erased_ids().is_empty());
        assert_eq!(host.release_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_ignored() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        tracker.submit(&payload(), true).await;

        assert!(!tracker.handle_downloads_changed(&DownloadDelta::complete(DownloadId(42))));
        assert!(!tracker.handle_downloads_changed(&DownloadDelta::failed(
            DownloadId(42),
            ERROR_FILE_FAILED
        )));
        assert_eq!(host.release_count(), 0);
        assert!(host.erased_ids().is_empty());
        assert_eq!(tracker.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_non_terminal_status_keeps_entry() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        tracker.submit(&payload(), false).await;

        let delta = DownloadDelta::failed(DownloadId(1), "NETWORK_FAILED");
        assert!(!tracker.handle_downloads_changed(&delta));
        assert_eq!(tracker.pending().len(), 1);
        assert_eq!(host.release_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_exports_are_independent() {
        let host = Arc::new(MockHost::accepts_all());
        let tracker = tracker(&host);
        let payload = payload();

        let (a, b) = tokio::join!(tracker.submit(&payload, false), tracker.submit(&payload, true));
        assert_ne!(a, b);
        assert_eq!(tracker.pending().len(), 2);

        tracker.handle_downloads_changed(&DownloadDelta::complete(DownloadId(2)));
        tracker.handle_downloads_changed(&DownloadDelta::complete(DownloadId(1)));
        assert!(tracker.pending().is_empty());
        assert_eq!(host.release_count(), 2);
    }
}
