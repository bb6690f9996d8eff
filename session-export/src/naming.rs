//! File name composition and path sanitization for exported sessions.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{ExportConfig, Localizer, SESSION_LABEL_KEY, SESSIONS_LABEL_KEY};
use crate::session::SessionRecord;

/// Characters never allowed in an exported file name.
const ILLEGAL_FILE_NAME_CHARS: &[char] = &['\\', '/', ':', '?', '.', '"', '<', '>', '|'];

// Applied to folder text in declaration order; character replacement has to
// come before separator normalization.
static FOLDER_SPECIAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[:?."<>|]"#).expect("valid folder special chars regex"));
static FOLDER_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\s+").expect("valid folder spaces regex"));
static FOLDER_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//+").expect("valid folder slashes regex"));
static FOLDER_SANDWICH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s/|/\s)+(\s|/)?").expect("valid folder sandwich regex"));
static FOLDER_EDGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s|/)+|(\s|/)+$").expect("valid folder edges regex"));

/// Folder prefix and file name of an export, both safe to join as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPath {
    /// Empty, or a relative folder ending in exactly one `/`
    pub folder_prefix: String,
    /// File name without extension
    pub file_name: String,
}

impl SanitizedPath {
    /// Full relative path handed to the download host.
    pub fn download_filename(&self) -> String {
        format!("{}{}.json", self.folder_prefix, self.file_name)
    }
}

/// Compose the file name for an export and sanitize it.
///
/// `now` is only used when several sessions are exported, since no single
/// session date applies then.
pub fn generate_file_name(
    sessions: &[SessionRecord],
    is_backup: bool,
    config: &ExportConfig,
    localizer: &dyn Localizer,
    now: DateTime<Utc>,
) -> String {
    let file_name = match sessions {
        [session] => {
            let tags_text = join_tags(&session.tag);
            let date_text = config.format_date(&session.date);
            if is_backup {
                format!(
                    "{} - {} {} - [{}]",
                    date_text, session.name, tags_text, session.id
                )
            } else {
                format!("{} {} - {}", session.name, tags_text, date_text)
            }
        }
        _ => {
            let label = if sessions.len() == 1 {
                localizer.message(SESSION_LABEL_KEY)
            } else {
                localizer.message(SESSIONS_LABEL_KEY)
            };
            format!("{} {} - {}", sessions.len(), label, config.format_date(&now))
        }
    };

    sanitize_file_name(&file_name)
}

/// Render tags as `#tag` separated by single spaces.
fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace characters that are illegal in file names with `-` and drop
/// leading spaces. Inner and trailing spaces are kept.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if ILLEGAL_FILE_NAME_CHARS.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim_start_matches(' ')
        .to_string()
}

/// Turn free-form folder text into a relative folder prefix.
///
/// The result is empty or ends in exactly one `/`, never starts with a
/// separator or whitespace, and sanitizing it again returns it unchanged.
pub fn sanitize_folder_path(folder: &str) -> String {
    let folder = FOLDER_SPECIAL_CHARS.replace_all(folder, "-");
    let folder = folder.replace('\\', "/");
    let folder = FOLDER_SPACES.replace_all(&folder, " ");
    let folder = FOLDER_SLASHES.replace_all(&folder, "/");
    let folder = FOLDER_SANDWICH.replace_all(&folder, "/");
    let folder = FOLDER_EDGES.replace_all(&folder, "");

    if folder.is_empty() {
        String::new()
    } else {
        format!("{}/", folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeZoneMode;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn config() -> ExportConfig {
        ExportConfig {
            date_format: "%Y-%m-%d".to_string(),
            time_zone: TimeZoneMode::Utc,
            ..ExportConfig::default()
        }
    }

    fn trip() -> SessionRecord {
        SessionRecord::new(
            "abc123",
            "Trip",
            vec!["work".to_string(), "2024".to_string()],
            Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap(),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 6, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_single_session_name() {
        let config = config();
        let name = generate_file_name(&[trip()], false, &config, &config, now());
        assert_eq!(name, "Trip #work #2024 - 2024-01-05");
    }

    #[test]
    fn test_single_session_backup_name() {
        let config = config();
        let name = generate_file_name(&[trip()], true, &config, &config, now());
        assert_eq!(name, "2024-01-05 - Trip #work #2024 - [abc123]");
    }

    #[test]
    fn test_multi_session_name() {
        let config = config();
        let sessions = vec![trip(), trip(), trip()];
        let name = generate_file_name(&sessions, false, &config, &config, now());
        assert_eq!(name, "3 sessions - 2024-01-06");

        // Backup mode doesn't change multi-session naming
        let name = generate_file_name(&sessions, true, &config, &config, now());
        assert_eq!(name, "3 sessions - 2024-01-06");
    }

    #[test]
    fn test_empty_tags_keep_inner_space() {
        let config = config();
        let mut session = trip();
        session.tag.clear();
        let name = generate_file_name(&[session], false, &config, &config, now());
        assert_eq!(name, "Trip  - 2024-01-05");
    }

    #[test]
    fn test_default_date_format_is_sanitized() {
        let config = ExportConfig {
            time_zone: TimeZoneMode::Utc,
            ..ExportConfig::default()
        };
        let name = generate_file_name(&[trip()], false, &config, &config, now());
        assert_eq!(name, "Trip #work #2024 - 2024-01-05 12-00-00");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name(r#"a\b/c:d?e.f"g<h>i|j"#),
            "a-b-c-d-e-f-g-h-i-j"
        );
        assert_eq!(sanitize_file_name("   leading"), "leading");
        assert_eq!(sanitize_file_name("trailing  "), "trailing  ");
        assert_eq!(sanitize_file_name("in  side"), "in  side");
    }

    #[test]
    fn test_name_with_illegal_chars() {
        let config = config();
        let mut session = trip();
        session.name = " docs.rs: <notes>".to_string();
        session.tag = vec!["a/b".to_string()];
        let name = generate_file_name(&[session], false, &config, &config, now());
        assert_eq!(name, "docs-rs- -notes- #a-b - 2024-01-05");
    }

    #[test]
    fn test_sanitize_folder_path() {
        assert_eq!(sanitize_folder_path("Backups"), "Backups/");
        assert_eq!(sanitize_folder_path(""), "");
        assert_eq!(sanitize_folder_path("   "), "");
        assert_eq!(sanitize_folder_path("///"), "");
        assert_eq!(sanitize_folder_path(" a  //  b\\c "), "a/b/c/");
        assert_eq!(sanitize_folder_path("my.folder:x"), "my-folder-x/");
        assert_eq!(sanitize_folder_path("a / b / c"), "a/b/c/");
        assert_eq!(sanitize_folder_path("a/ /b"), "a/b/");
        assert_eq!(sanitize_folder_path("Tab  Sessions"), "Tab Sessions/");
    }

    #[test]
    fn test_download_filename() {
        let path = SanitizedPath {
            folder_prefix: "Backups/".to_string(),
            file_name: "Trip".to_string(),
        };
        assert_eq!(path.download_filename(), "Backups/Trip.json");

        let path = SanitizedPath {
            folder_prefix: String::new(),
            file_name: "Trip".to_string(),
        };
        assert_eq!(path.download_filename(), "Trip.json");
    }

    proptest! {
        #[test]
        fn prop_folder_has_no_special_chars(input in r#"[a-z :?."<>|/\\\t]{0,24}"#) {
            let folder = sanitize_folder_path(&input);
            prop_assert!(!folder.contains([':', '?', '.', '"', '<', '>', '|', '\\']));
        }

        #[test]
        fn prop_folder_edges(input in r#"[a-z :?./\\\t]{0,24}"#) {
            let folder = sanitize_folder_path(&input);
            if !folder.is_empty() {
                prop_assert!(folder.ends_with('/'));
                prop_assert!(!folder.ends_with("//"));
                prop_assert!(!folder.starts_with('/'));
                prop_assert!(!folder.starts_with(char::is_whitespace));
                prop_assert!(!folder.contains("  "));
            }
        }

        #[test]
        fn prop_folder_idempotent(input in r#"[a-z :?./\\\t]{0,24}"#) {
            let once = sanitize_folder_path(&input);
            prop_assert_eq!(sanitize_folder_path(&once), once);
        }
    }
}
