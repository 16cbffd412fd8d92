//! edenred-export - download Edenred benefits-card movements
//!
//! - `edenred-export cards` lists the cards on the account
//! - `edenred-export transactions` prints movements as JSON
//! - `edenred-export export` saves movements to `transactions/<timestamp>.csv`

mod cli;

use clap::Parser;
use cli::{exit_codes, Cli};

use edenred_export::core::PersonalInfoRedactor;
use edenred_export::export::ExportError;
use edenred_export::logging;
use edenred_export::portal::{AuthError, FetchError, InvalidEndpoint, ResolutionError};
use edenred_export::settings::SettingsError;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.json_output) {
        eprintln!("Failed to initialize logging: {}", e);
        return exit_codes::UNEXPECTED_FAILURE;
    }

    let args: Vec<String> = std::env::args().collect();
    tracing::debug!("Args: {:?}", PersonalInfoRedactor::redact_args(&args));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create runtime: {}", e);
            return exit_codes::UNEXPECTED_FAILURE;
        }
    };

    rt.block_on(async {
        match cli::run(cli).await {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                categorize_error(&e)
            }
        }
    })
}

/// Categorize an error into the appropriate exit code
fn categorize_error(e: &anyhow::Error) -> i32 {
    for cause in e.chain() {
        if cause.is::<AuthError>() {
            return exit_codes::AUTH_FAILURE;
        }
        if cause.is::<ResolutionError>() || cause.is::<FetchError>() {
            return exit_codes::PORTAL_FAILURE;
        }
        if cause.is::<ExportError>() {
            return exit_codes::EXPORT_FAILURE;
        }
        if cause.is::<SettingsError>() || cause.is::<InvalidEndpoint>() {
            return exit_codes::CONFIG_ERROR;
        }
    }
    exit_codes::UNEXPECTED_FAILURE
}
