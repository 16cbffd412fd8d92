//! Client for the Edenred customer portal
//!
//! Logs in (plain or with an emailed two-factor code), looks up the account's
//! benefits card, downloads its movements and saves them as CSV or JSON.
//!
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use edenred_export::core::Credentials;
//! use edenred_export::export::{save_transactions, ExportOptions};
//! use edenred_export::portal::{AuthFlow, Authenticator, HttpTransport, PortalClient, TerminalPrompt};
//!
//! let transport = Arc::new(HttpTransport::new(std::time::Duration::from_secs(30))?);
//! let auth = Authenticator::new(AuthFlow::TwoFactor).with_prompt(Arc::new(TerminalPrompt));
//! let mut client = PortalClient::new(transport, "https://empleados.edenred.es", auth)?;
//!
//! client.login(&Credentials::new("me@example.com", "secret")).await?;
//! let transactions = client.transactions(None).await?;
//! let path = save_transactions(Some(transactions.as_slice()), &ExportOptions::default())?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! One client holds one session. Use separate clients for separate accounts.

pub mod core;
pub mod export;
pub mod logging;
pub mod portal;
pub mod settings;
