// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging and hand over to the
//   UI flow.
// - Turns the outcome into the process exit code.

use alt_text_migrate::config::Cli;
use alt_text_migrate::ui;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so they stay out of the prompts. `RUST_LOG`
    // overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = ui::run(cli).await;
    if let Err(e) = &result {
        eprintln!("{}", ui::failure_message(e));
    }
    ExitCode::from(ui::exit_status(&result))
}
