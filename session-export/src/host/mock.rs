//! Mock download host for testing
//!
//! Records every call so tests can assert how often resources were created,
//! released and how download records were erased.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::{DownloadHost, DownloadId, DownloadRequest, ResourceHandle};
use crate::error::SubmissionError;
use crate::payload::ExportPayload;

/// A mock host that accepts or rejects every submission
pub struct MockHost {
    /// Next download id handed out on acceptance
    next_id: AtomicU64,
    /// Number of resources created so far
    created: AtomicUsize,
    /// Error returned on submission (None = always accept)
    reject_with: Option<SubmissionError>,
    /// Submitted requests in order
    requests: Mutex<Vec<DownloadRequest>>,
    /// URLs of released resources in order
    released: Mutex<Vec<String>>,
    /// Ids passed to erase_download_record in order
    erased: Mutex<Vec<DownloadId>>,
}

impl MockHost {
    /// Create a host that accepts every download, numbering ids from 1
    pub fn accepts_all() -> Self {
        Self::with_outcome(None)
    }

    /// Create a host that rejects every download with the given error
    pub fn rejects_with(error: SubmissionError) -> Self {
        Self::with_outcome(Some(error))
    }

    fn with_outcome(reject_with: Option<SubmissionError>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            created: AtomicUsize::new(0),
            reject_with,
            requests: Mutex::new(Vec::new()),
            released: Mutex::new(Vec::new()),
            erased: Mutex::new(Vec::new()),
        }
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.released.lock().unwrap().len()
    }

    pub fn released_urls(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    pub fn erased_ids(&self) -> Vec<DownloadId> {
        self.erased.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadHost for MockHost {
    fn create_resource(&self, _payload: &ExportPayload) -> ResourceHandle {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        ResourceHandle::new(format!("blob:mock/{}", n))
    }

    async fn submit_download(
        &self,
        request: DownloadRequest,
    ) -> std::result::Result<DownloadId, SubmissionError> {
        self.requests.lock().unwrap().push(request);

        if let Some(err) = &self.reject_with {
            return Err(err.clone());
        }

        Ok(DownloadId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn erase_download_record(&self, id: DownloadId) {
        self.erased.lock().unwrap().push(id);
    }

    fn release_resource(&self, handle: ResourceHandle) {
        self.released.lock().unwrap().push(handle.url().to_string());
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
