//! ghls - list GitHub repositories from the terminal.
//!
//! Prints one line per repository, from `~/.ghls_cache` while it is less than
//! a day old and from the GitHub API otherwise.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ghls::app::App;
use ghls::config::{Cli, Settings};
use ghls::github::GitHubSource;

/// Initialize the tracing subscriber for logging to stderr.
fn init_tracing(verbose: bool) {
    // RUST_LOG wins over the -v default
    let default = if verbose { "ghls=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match Settings::from_cli(cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut source = GitHubSource::new(settings.api_url.clone());
    let app = App::new(settings);

    match app.run(&mut source, io::stdout()).await {
        Ok(outcome) => {
            debug!(?outcome, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
