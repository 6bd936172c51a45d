// Command line configuration. Every value can come from a flag or an
// environment variable; whatever is still missing is asked for
// interactively by `ui`.

use clap::Parser;
use std::path::PathBuf;

use crate::update::MissingFilePolicy;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Copy alt text from a Mastodon outbox export onto the matching files in
/// a Misskey/Sharkey drive.
#[derive(Debug, Parser)]
#[command(name = "alt-text-migrate", version, about)]
pub struct Cli {
    /// Instance URL, e.g. `sharkey.example` or `https://sharkey.example`
    #[arg(long, env = "ALT_MIGRATE_INSTANCE")]
    pub instance: Option<String>,

    /// Access token with drive read/write permission
    #[arg(long, env = "ALT_MIGRATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the exported outbox.json
    #[arg(long)]
    pub outbox: Option<PathBuf>,

    /// Folder listings in flight at once per tree level
    #[arg(long, env = "ALT_MIGRATE_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// What to do when an attachment is not found in the detected folder
    #[arg(long, value_enum, default_value_t = MissingFilePolicy::Abort)]
    pub on_missing: MissingFilePolicy,

    /// Accept the detected folder without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub instance_url: String,
    pub token: String,
    pub outbox_path: PathBuf,
    pub concurrency: usize,
    pub on_missing: MissingFilePolicy,
    pub assume_yes: bool,
}

impl Settings {
    /// Build settings from the parsed flags and the (possibly prompted)
    /// instance, token and outbox values.
    pub fn new(cli: &Cli, instance: &str, token: String, outbox_path: PathBuf) -> Self {
        Settings {
            instance_url: normalise_instance_url(instance),
            token,
            outbox_path,
            concurrency: cli.concurrency.max(1),
            on_missing: cli.on_missing,
            assume_yes: cli.yes,
        }
    }
}

/// Prefix `https://` unless a scheme is already given, and drop trailing
/// slashes so endpoint paths join cleanly.
pub fn normalise_instance_url(instance: &str) -> String {
    let trimmed = instance.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
