// Library root
// -----------
// The binary (`main.rs`) is a thin shell around these modules.
//
// Module responsibilities:
// - `api`: HTTP client for the instance's drive API (token handling,
//   folder listing, file lookup and comment updates).
// - `outbox`: reads the exported outbox and extracts attachments.
// - `folders`: walks the drive folder tree and locates the folder that
//   holds the archived media.
// - `update`: writes alt text onto the matching drive files.
// - `config`: command line flags and the resolved `Settings`.
// - `error`: failures the binary reports with their own message.
// - `ui`: prompts, confirmation and progress bar around the migration.
pub mod api;
pub mod config;
pub mod error;
pub mod folders;
pub mod outbox;
pub mod ui;
pub mod update;
