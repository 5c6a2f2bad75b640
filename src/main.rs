use anyhow::{Context, Result};
use clap::Parser;
use sheetbridge::commands;
use sheetbridge::http::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use sheetbridge::{ClientConfig, SheetsApi};
use std::time::Duration;

/// sheetbridge - client for a spreadsheet-backed inventory endpoint
///
/// Sends actions (items, bookings, loadings, transactions, dispatch, returns,
/// audit log) to the remote web endpoint and prints the JSON response.
///
/// Examples:
///   sheetbridge ping
///   sheetbridge call getBookings --param status=pending
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Endpoint URL of the deployed web app
    #[arg(long = "url", env = "SHEETS_SCRIPT_URL", value_name = "URL", global = true)]
    pub script_url: Option<String>,

    /// Email sent as caller identity with every request
    #[arg(long, env = "SHEETS_USER_EMAIL", value_name = "EMAIL", global = true)]
    pub email: Option<String>,

    /// Total attempts per request for transport failures
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: u32,

    /// Base delay for exponential backoff between attempts
    #[arg(long = "base-delay-ms", default_value_t = DEFAULT_BASE_DELAY_MS, global = true)]
    pub base_delay_ms: u64,

    /// Log request and response details
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check that the endpoint answers (single attempt, no retry)
    Ping,

    /// Run any action by name
    Call(CallArgs),

    /// List inventory items
    Items,

    /// Show current inventory levels
    Inventory,

    /// List users
    Users,

    /// Read the audit log
    AuditLog(AuditLogArgs),

    /// Export a sheet
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct CallArgs {
    /// Remote action name, e.g. "getBookings"
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// JSON payload; when given the request is sent as POST
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Extra query parameter (repeatable)
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AuditLogArgs {
    /// Number of entries to fetch
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Name of the sheet to export
    #[arg(value_name = "SHEET")]
    pub sheet: String,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let url = self
            .script_url
            .as_deref()
            .context("Missing endpoint URL: pass --url or set SHEETS_SCRIPT_URL")?;
        let email = self
            .email
            .as_deref()
            .context("Missing identity: pass --email or set SHEETS_USER_EMAIL")?;

        let retry = RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms));
        Ok(ClientConfig::new(url, email)?
            .with_retry_policy(retry)
            .with_debug(self.debug))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.debug { "sheetbridge=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let api = SheetsApi::new(cli.client_config()?)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Ping => {
            if !commands::ping(&api, &mut out).await? {
                anyhow::bail!("Connection probe failed");
            }
        }
        Commands::Call(args) => {
            commands::call(&api, &args.action, args.data.as_deref(), &args.params, &mut out)
                .await?
        }
        Commands::Items => commands::print_result(&mut out, &api.get_items().await?)?,
        Commands::Inventory => commands::print_result(&mut out, &api.get_inventory().await?)?,
        Commands::Users => commands::print_result(&mut out, &api.get_users().await?)?,
        Commands::AuditLog(args) => {
            commands::print_result(&mut out, &api.get_audit_log(args.limit).await?)?
        }
        Commands::Export(args) => {
            commands::print_result(&mut out, &api.export_sheet(&args.sheet).await?)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_call_parsing() {
        let cli = Cli::try_parse_from([
            "sheetbridge",
            "call",
            "getBookings",
            "-p",
            "status=pending",
            "--param",
            "from=2024-01-01",
            "--url",
            "https://example.com/exec",
        ])
        .unwrap();
        match cli.command {
            Commands::Call(args) => {
                assert_eq!(args.action, "getBookings");
                assert_eq!(args.params, vec!["status=pending", "from=2024-01-01"]);
                assert_eq!(args.data, None);
            }
            _ => panic!("Expected Call command"),
        }
        assert_eq!(cli.script_url.as_deref(), Some("https://example.com/exec"));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["sheetbridge", "ping"]).unwrap();
        assert_eq!(cli.max_attempts, 3);
        assert_eq!(cli.base_delay_ms, 500);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_audit_log_parsing() {
        let cli = Cli::try_parse_from(["sheetbridge", "audit-log", "--limit", "25"]).unwrap();
        match cli.command {
            Commands::AuditLog(args) => assert_eq!(args.limit, Some(25)),
            _ => panic!("Expected AuditLog command"),
        }
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = Cli::try_parse_from([
            "sheetbridge",
            "--url",
            "https://example.com/exec",
            "--email",
            "clerk@example.com",
            "--max-attempts",
            "5",
            "--base-delay-ms",
            "10",
            "--debug",
            "items",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.email, "clerk@example.com");
        assert_eq!(config.retry.max_attempts(), 5);
        assert_eq!(config.retry.base_delay(), Duration::from_millis(10));
        assert!(config.debug);
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["sheetbridge", "--debug"]);
        assert!(result.is_err());
    }
}
