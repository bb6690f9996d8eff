//! Session export library
//!
//! Turns session records into a JSON download with a sanitized, readable
//! file path and tracks the transient resource behind each download:
//! - Naming: file name composition plus file/folder sanitization
//! - Payload: pretty-printed JSON of the exported sessions
//! - Tracker: pending download table with exactly-once resource release

pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod naming;
pub mod payload;
pub mod pending;
pub mod session;
pub mod tracker;

pub use config::{ExportConfig, Localizer, TimeZoneMode, format_date};
pub use error::{ExportError, Result, SubmissionError};
pub use export::{ExportOutcome, ExportRequest, Exporter};
pub use host::{
    ConflictAction, DownloadDelta, DownloadHost, DownloadId, DownloadRequest, DownloadStatus,
    MockHost, ResourceHandle,
};
pub use naming::{SanitizedPath, generate_file_name, sanitize_file_name, sanitize_folder_path};
pub use payload::{ExportPayload, JSON_MIME_TYPE, build_export_payload};
pub use pending::{PendingDownload, PendingSnapshot, PendingTable};
pub use session::{MemorySessionStore, SessionRecord, SessionStore};
pub use tracker::{DownloadTracker, SubmitOutcome};
