//! Command-line interface

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input, Password};

use edenred_export::core::Credentials;
use edenred_export::export::{self, ExportFormat, ExportOptions};
use edenred_export::portal::{
    AuthFlow, Authenticator, CodePrompt, FixedCode, HttpTransport, PortalClient, TerminalPrompt,
};
use edenred_export::settings::Settings;

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED_FAILURE: i32 = 1;
    pub const AUTH_FAILURE: i32 = 2;
    pub const PORTAL_FAILURE: i32 = 3;
    pub const EXPORT_FAILURE: i32 = 4;
    pub const CONFIG_ERROR: i32 = 5;
}

/// Download Edenred card movements and save them as CSV or JSON
#[derive(Parser, Debug)]
#[command(name = "edenred-export", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to <config dir>/edenred-export/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_output: bool,

    #[command(flatten)]
    pub login: LoginArgs,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, env = "EDENRED_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password (prompted for when missing)
    #[arg(long, env = "EDENRED_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Portal base URL
    #[arg(long, env = "EDENRED_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Login exchange the portal expects
    #[arg(long, value_enum, global = true)]
    pub auth_flow: Option<AuthFlow>,

    /// Two-factor code, skips the interactive prompt
    #[arg(long, env = "EDENRED_AUTH_CODE", hide_env_values = true, global = true)]
    pub code: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cards on the account as JSON
    Cards,

    /// Print card movements as JSON
    Transactions(TransactionsArgs),

    /// Save card movements to a timestamped file
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct TransactionsArgs {
    /// Card to read; defaults to the first card on the account
    #[arg(long)]
    pub card_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Card to read; defaults to the first card on the account
    #[arg(long)]
    pub card_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output folder
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// File name without extension, instead of the minute timestamp
    #[arg(long)]
    pub file_name: Option<String>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let mut client = build_client(&cli.login, &settings)?;

    let credentials = credentials(&cli.login, &settings).await?;
    client.login(&credentials).await?;

    match cli.command {
        Commands::Cards => {
            let cards = client.cards().await?;
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        Commands::Transactions(args) => {
            let transactions = client.transactions(args.card_id.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&transactions)?);
        }
        Commands::Export(args) => {
            let transactions = client.transactions(args.card_id.as_deref()).await?;

            let mut options = ExportOptions::default()
                .with_format(args.format.unwrap_or(settings.format))
                .with_folder(args.folder.unwrap_or_else(|| settings.folder.clone()));
            if let Some(name) = args.file_name {
                options = options.with_file_name(name);
            }

            let path = export::save_transactions(Some(transactions.as_slice()), &options)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn build_client(login: &LoginArgs, settings: &Settings) -> Result<PortalClient> {
    let transport = HttpTransport::new(settings.timeout()).context("Failed to build HTTP client")?;

    let flow = login.auth_flow.unwrap_or(settings.auth_flow);
    let prompt: Arc<dyn CodePrompt> = match &login.code {
        Some(code) => Arc::new(FixedCode::new(code.clone())),
        None => Arc::new(TerminalPrompt),
    };
    let authenticator = Authenticator::new(flow).with_prompt(prompt);

    let client = PortalClient::new(Arc::new(transport), &settings.endpoint, authenticator)?;
    Ok(client)
}

async fn credentials(login: &LoginArgs, settings: &Settings) -> Result<Credentials> {
    let email = match login.email.clone().or_else(|| settings.email.clone()) {
        Some(email) => email,
        None => ask(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Edenred email")
                .interact_text()
        })
        .await
        .context("Failed to read email")?,
    };

    let password = match login.password.clone() {
        Some(password) => password,
        None => ask(|| {
            Password::with_theme(&ColorfulTheme::default())
                .with_prompt("Edenred password")
                .interact()
        })
        .await
        .context("Failed to read password")?,
    };

    let mut credentials = Credentials::new(email, password);
    if let Some(endpoint) = &login.endpoint {
        credentials = credentials.with_endpoint(endpoint.clone());
    }
    Ok(credentials)
}

/// Run a terminal prompt off the async runtime
async fn ask<F>(prompt: F) -> Result<String>
where
    F: FnOnce() -> dialoguer::Result<String> + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(prompt)
        .await
        .context("Prompt task aborted")??;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from([
            "edenred-export",
            "export",
            "--format",
            "json",
            "--folder",
            "out",
            "--auth-flow",
            "cookie",
            "--email",
            "a@b.com",
        ])
        .unwrap();

        assert_eq!(cli.login.auth_flow, Some(AuthFlow::Cookie));
        assert_eq!(cli.login.email.as_deref(), Some("a@b.com"));
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.format, Some(ExportFormat::Json));
                assert_eq!(args.folder, Some(PathBuf::from("out")));
                assert_eq!(args.card_id, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_transactions_with_card() {
        let cli =
            Cli::try_parse_from(["edenred-export", "transactions", "--card-id", "42", "-v"])
                .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Transactions(args) => assert_eq!(args.card_id.as_deref(), Some("42")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_credentials_from_flags_and_settings() {
        let cli = Cli::try_parse_from([
            "edenred-export",
            "cards",
            "--password",
            "hunter2",
            "--endpoint",
            "https://other.test",
        ])
        .unwrap();
        let settings = Settings {
            email: Some("john@example.com".to_string()),
            ..Settings::default()
        };

        let credentials = credentials(&cli.login, &settings).await.unwrap();
        assert_eq!(credentials.email, "john@example.com");
        assert_eq!(credentials.password, "hunter2");
        assert_eq!(credentials.endpoint.as_deref(), Some("https://other.test"));
    }

    #[tokio::test]
    async fn test_prompt_runs_off_runtime() {
        let answer = ask(|| Ok("typed".to_string())).await.unwrap();
        assert_eq!(answer, "typed");

        let failed = ask(|| Err(dialoguer::Error::IO(std::io::Error::other("no tty")))).await;
        assert!(failed.is_err());
    }

    #[test]
    fn test_unknown_flow_rejected() {
        assert!(Cli::try_parse_from(["edenred-export", "cards", "--auth-flow", "sms"]).is_err());
    }
}
