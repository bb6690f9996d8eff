//! Export payload: the JSON document and the path it is saved under.

use chrono::{DateTime, Utc};

use crate::config::{ExportConfig, Localizer};
use crate::error::Result;
use crate::naming::{SanitizedPath, generate_file_name, sanitize_folder_path};
use crate::session::SessionRecord;

pub const JSON_MIME_TYPE: &str = "application/json";

/// Serialized sessions plus their sanitized download path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Sessions as a 2-space indented JSON array
    pub json: String,
    pub path: SanitizedPath,
}

impl ExportPayload {
    pub fn mime_type(&self) -> &'static str {
        JSON_MIME_TYPE
    }
}

/// Serialize `sessions` and work out where they are saved.
///
/// Callers must not pass an empty slice; an empty lookup is a no-op upstream.
pub fn build_export_payload(
    sessions: &[SessionRecord],
    folder: &str,
    is_backup: bool,
    config: &ExportConfig,
    localizer: &dyn Localizer,
    now: DateTime<Utc>,
) -> Result<ExportPayload> {
    let json = serde_json::to_string_pretty(sessions)?;
    let path = SanitizedPath {
        folder_prefix: sanitize_folder_path(folder),
        file_name: generate_file_name(sessions, is_backup, config, localizer, now),
    };

    Ok(ExportPayload { json, path })
}
