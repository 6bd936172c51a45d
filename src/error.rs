// Classified failures: the conditions the binary reports with a dedicated
// message. Everything else travels as a plain `anyhow::Error`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Couldn't find \"{}\", is the path correct?", path.display())]
    OutboxNotFound { path: PathBuf },

    #[error("Couldn't find a drive folder containing the attachments (looked for \"{filename}\").")]
    FolderNotFound { filename: String },

    #[error("No file named \"{filename}\" in drive folder \"{folder}\".")]
    FileNotFound { filename: String, folder: String },

    #[error("Parameters for \"{endpoint}\" must serialize to a JSON object")]
    InvalidParams { endpoint: String },
}
