// UI layer: collects whatever configuration the flags did not provide
// with `dialoguer`, then runs the migration with an `indicatif` progress
// bar. The migration itself is in `migrate`, which only prompts for the
// folder confirmation and skips even that with `--yes`.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

use crate::api::ApiClient;
use crate::config::{Cli, Settings};
use crate::error::MigrateError;
use crate::folders::{find_folder_containing, list_all_folders};
use crate::outbox::{attachment_count_label, Outbox};
use crate::update::{update_attachments, UpdateReport};

/// How a run ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(UpdateReport),
    /// The user said the detected folder was wrong.
    Declined,
    /// The outbox holds no attachments.
    NothingToDo,
}

pub const DONE_MESSAGE: &str = "Done! Your images should now have alt text in sharkey.";

pub fn found_message(count: usize) -> String {
    format!("Found {} to update in sharkey.", attachment_count_label(count))
}

/// Process exit status for a finished run: declining the folder or having
/// nothing to migrate still counts as success.
pub fn exit_status(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Line printed to stderr for a failed run. Classified failures carry their
/// own wording.
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<MigrateError>() {
        Some(known) => known.to_string(),
        None => format!("Error: {:#}", err),
    }
}

/// Prompt for missing settings, then migrate.
pub async fn run(cli: Cli) -> Result<Outcome> {
    let settings = resolve_settings(&cli)?;
    migrate(&settings).await
}

/// Fill the gaps in the command line with interactive prompts.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let instance = match &cli.instance {
        Some(instance) => instance.clone(),
        None => Input::new()
            .with_prompt("Enter the url of your instance")
            .interact_text()?,
    };
    // `Password` keeps the token off the screen.
    let token = match &cli.token {
        Some(token) => token.clone(),
        None => Password::new()
            .with_prompt("Enter your access token")
            .interact()?,
    };
    let outbox_path = match &cli.outbox {
        Some(path) => path.clone(),
        None => {
            let path: String = Input::new()
                .with_prompt("Enter the path to your outbox.json")
                .interact_text()?;
            PathBuf::from(path)
        }
    };
    Ok(Settings::new(cli, &instance, token, outbox_path))
}

/// Run the whole migration for already resolved settings.
pub async fn migrate(settings: &Settings) -> Result<Outcome> {
    let resolved = std::path::absolute(&settings.outbox_path)
        .unwrap_or_else(|_| settings.outbox_path.clone());
    if !resolved.exists() {
        return Err(MigrateError::OutboxNotFound { path: resolved }.into());
    }

    let attachments = Outbox::from_path(&resolved)?.attachments();
    let count = attachments.len();
    println!("{}", found_message(count));
    let Some(sample) = attachments.first() else {
        return Ok(Outcome::NothingToDo);
    };

    let api = ApiClient::new(&settings.instance_url, &settings.token)?;
    info!(instance = api.base_url(), "searching drive folders");

    let folders = list_all_folders(&api, settings.concurrency).await?;
    let folder = find_folder_containing(&api, &folders, &sample.filename)
        .await?
        .ok_or_else(|| MigrateError::FolderNotFound {
            filename: sample.filename.clone(),
        })?;

    if !settings.assume_yes {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "It looks like the images are in your drive folder \"{}\". Does that look right?",
                folder.display_path()
            ))
            .interact()?;
        if !proceed {
            return Ok(Outcome::Declined);
        }
    }

    println!("Updating images...");
    let bar = ProgressBar::new(count as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {percent}% | ETA: {eta} | {pos}/{len}")
            .context("Invalid progress bar template")?
            .progress_chars("█░"),
    );

    let result = update_attachments(
        &api,
        &folder,
        &attachments,
        settings.on_missing,
        |_| bar.inc(1),
    )
    .await;
    bar.finish();
    let report = result?;

    if !report.skipped.is_empty() {
        println!(
            "Skipped {} with no matching drive file:",
            attachment_count_label(report.skipped.len())
        );
        for filename in &report.skipped {
            println!("  {}", filename);
        }
    }
    println!("{}", DONE_MESSAGE);
    Ok(Outcome::Completed(report))
}
