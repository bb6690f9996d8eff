use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use session_export::{
    ExportConfig, MemorySessionStore, SessionStore, TimeZoneMode, build_export_payload,
    sanitize_folder_path,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "sessport",
    about = "Preview session export file names and manage export settings",
    long_about = "Applies the export naming rules to a JSON file of sessions and shows the resulting download path and payload"
)]
#[command(version)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how folder text is sanitized
    Folder {
        /// Folder text as a user would type it
        text: String,
    },
    /// Show the download path an export would use
    Name {
        #[command(flatten)]
        selection: Selection,

        /// Folder to export into
        #[arg(short, long, default_value = "")]
        folder: String,
    },
    /// Print the JSON payload an export would contain
    Payload {
        #[command(flatten)]
        selection: Selection,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct Selection {
    /// JSON file containing an array of sessions
    file: PathBuf,

    /// Export only the session with this id
    #[arg(long)]
    id: Option<String>,

    /// Use backup naming
    #[arg(short, long)]
    backup: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the strftime pattern used for dates
    SetDateFormat {
        /// Pattern, e.g. "%Y-%m-%d %H-%M"
        pattern: String,
    },
    /// Render dates in local time or UTC
    SetTimeZone {
        /// "local" or "utc"
        zone: String,
    },
    /// Set the labels used for session counts
    SetLabels {
        /// Singular label
        singular: String,
        /// Plural label
        plural: String,
    },
}

/// Handle config subcommands
fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = ExportConfig::load()?;
            let path = ExportConfig::config_path()?;
            println!("Config file: {}", path.display());
            println!();
            println!("{:#?}", config);
        }
        ConfigAction::SetDateFormat { pattern } => {
            let mut config = ExportConfig::load()?;
            config.date_format = pattern.clone();
            config.save()?;
            println!("Date format set to: {}", pattern);
            println!("Example: {}", config.format_date(&Utc::now()));
        }
        ConfigAction::SetTimeZone { zone } => {
            let mut config = ExportConfig::load()?;
            config.time_zone = TimeZoneMode::from_str(zone)?;
            config.save()?;
            println!("Time zone set to: {:?}", config.time_zone);
        }
        ConfigAction::SetLabels { singular, plural } => {
            let mut config = ExportConfig::load()?;
            config.session_label = singular.clone();
            config.sessions_label = plural.clone();
            config.save()?;
            println!("Labels set to: {} / {}", singular, plural);
        }
    }
    Ok(())
}

/// Load sessions from a JSON file
fn load_store(path: &Path) -> Result<MemorySessionStore> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read sessions file: {}", path.display()))?;
    MemorySessionStore::from_json(&content)
        .context(format!("Invalid sessions file: {}", path.display()))
}

/// Print the path or payload for a selection. Prints nothing when the
/// selection matches no sessions.
async fn preview(selection: &Selection, folder: &str, show_payload: bool) -> Result<()> {
    let config = ExportConfig::load().context("Failed to load export configuration")?;
    let store = load_store(&selection.file)?;

    let Some(sessions) = store
        .lookup_sessions(selection.id.as_deref())
        .await
        .filter(|sessions| !sessions.is_empty())
    else {
        log::warn!("No sessions matched in {}", selection.file.display());
        return Ok(());
    };

    let payload = build_export_payload(
        &sessions,
        folder,
        selection.backup,
        &config,
        &config,
        Utc::now(),
    )?;

    if show_payload {
        println!("{}", payload.json);
    } else {
        println!("{}", payload.path.download_filename());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match &args.command {
        Commands::Folder { text } => {
            println!("{:?}", sanitize_folder_path(text));
            Ok(())
        }
        Commands::Name { selection, folder } => preview(selection, folder, false).await,
        Commands::Payload { selection } => preview(selection, "", true).await,
        Commands::Config { action } => handle_config_command(action),
    }
}
