//! Session export: lookup, payload and tracked download in one call.

use chrono::Utc;
use std::sync::Arc;

use crate::config::{ExportConfig, Localizer};
use crate::error::{Result, SubmissionError};
use crate::host::{DownloadDelta, DownloadHost, DownloadId};
use crate::payload::build_export_payload;
use crate::session::SessionStore;
use crate::tracker::{DownloadTracker, SubmitOutcome};

/// What to export and how
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRequest {
    /// Session id, or `None` for every session
    pub session_selector: Option<String>,
    /// Free-form folder text, sanitized before use
    pub folder_path: String,
    /// Backup naming, overwrite on conflict, no save dialog
    pub is_backup: bool,
}

impl ExportRequest {
    /// Export every session
    pub fn all(folder_path: impl Into<String>) -> Self {
        Self {
            session_selector: None,
            folder_path: folder_path.into(),
            is_backup: false,
        }
    }

    /// Export one session
    pub fn single(id: impl Into<String>, folder_path: impl Into<String>) -> Self {
        Self {
            session_selector: Some(id.into()),
            folder_path: folder_path.into(),
            is_backup: false,
        }
    }

    /// Back up one session
    pub fn backup(id: impl Into<String>, folder_path: impl Into<String>) -> Self {
        Self {
            is_backup: true,
            ..Self::single(id, folder_path)
        }
    }
}

/// How an export ended from the caller's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The lookup returned nothing; no download was started
    NoData,
    /// The host accepted the download
    Pending(DownloadId),
    /// The host refused the download
    Rejected(SubmissionError),
}

pub struct Exporter {
    store: Arc<dyn SessionStore>,
    config: ExportConfig,
    localizer: Option<Arc<dyn Localizer>>,
    tracker: DownloadTracker,
}

impl Exporter {
    pub fn new(
        store: Arc<dyn SessionStore>,
        host: Arc<dyn DownloadHost>,
        config: ExportConfig,
    ) -> Self {
        Self {
            store,
            config,
            localizer: None,
            tracker: DownloadTracker::new(host),
        }
    }

    /// Use a separate localizer instead of the labels in the config
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_deref().unwrap_or(&self.config)
    }

    /// Export the selected sessions as a JSON download.
    ///
    /// Host failures are logged and reported through the outcome; only a
    /// failure to encode the sessions is returned as an error.
    pub async fn export_sessions(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        log::debug!("export_sessions {:?}", request);

        let selector = request.session_selector.as_deref();
        let sessions = match self.store.lookup_sessions(selector).await {
            Some(sessions) if !sessions.is_empty() => sessions,
            _ => {
                log::debug!("No sessions to export for {:?}", selector);
                return Ok(ExportOutcome::NoData);
            }
        };

        let payload = build_export_payload(
            &sessions,
            &request.folder_path,
            request.is_backup,
            &self.config,
            self.localizer(),
            Utc::now(),
        )?;

        let outcome = match self.tracker.submit(&payload, request.is_backup).await {
            SubmitOutcome::Pending(id) => ExportOutcome::Pending(id),
            SubmitOutcome::Rejected(err) => ExportOutcome::Rejected(err),
        };
        Ok(outcome)
    }

    /// Forward a host status notification to the tracker
    pub fn handle_downloads_changed(&self, delta: &DownloadDelta) -> bool {
        self.tracker.handle_downloads_changed(delta)
    }

    /// Number of downloads still waiting for a terminal status
    pub fn pending_count(&self) -> usize {
        self.tracker.pending().len()
    }
}
