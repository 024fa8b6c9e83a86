use anyhow::Result;
use clap::Parser;
use log::{debug, error, warn};
use order_sync::config::{Config, ConfigOverrides, DEFAULT_LOG_FILE};
use order_sync::http::HttpClient;
use order_sync::logging::Logging;
use order_sync::requester::sync;
use order_sync::runtime::RealRuntime;
use std::path::PathBuf;

/// order-sync - scheduled endpoint health/sync call
///
/// Sends a GET to API_URL, retrying up to MAX_RETRIES times with RETRY_DELAY
/// seconds between failed attempts, and appends the outcome to a log file.
///
/// Variables are read from the environment and from a .env file in the
/// current directory; the environment wins when both define a variable.
///
/// Environment:
///   API_URL               Endpoint to call (required)
///   MAX_RETRIES           Number of attempts (default 3)
///   RETRY_DELAY           Seconds between attempts (default 5)
///   REQUEST_TIMEOUT       Per-request timeout in seconds (default none)
///   ACCEPT_INVALID_CERTS  Skip TLS certificate validation (default false)
///   FAIL_ON_ERROR         Exit 1 when the run does not succeed (default false)
#[derive(Parser, Debug)]
#[command(author, version = env!("ORDER_SYNC_VERSION"), about)]
struct Cli {
    /// Endpoint to call (overrides API_URL)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// File the log is appended to
    #[arg(
        long = "log-file",
        env = "LOG_FILE",
        value_name = "PATH",
        default_value = DEFAULT_LOG_FILE
    )]
    log_file: PathBuf,

    /// Skip TLS certificate validation. Unsafe; for test endpoints only
    #[arg(long)]
    insecure: bool,

    /// Exit with status 1 when every attempt fails or the run is aborted
    #[arg(long = "fail-on-error")]
    fail_on_error: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            accept_invalid_certs: self.insecure,
            fail_on_error: self.fail_on_error,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before parsing so LOG_FILE from .env is seen; never overrides the environment
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let logging = Logging::init(&cli.log_file)?;

    match dotenv {
        Ok(path) => debug!("Loaded variables from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Ignoring .env file: {}", e),
    }
    debug!("Logging to {:?}", logging.path());

    let runtime = RealRuntime;
    let config = match Config::load(&runtime, &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let client = match HttpClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{:#}", e);
            return Err(e);
        }
    };

    if let Err(e) = sync(&runtime, &client, &config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["order-sync"]).unwrap();
        assert_eq!(cli.api_url, None);
        assert!(!cli.insecure);
        assert!(!cli.fail_on_error);

        let overrides = cli.overrides();
        assert_eq!(overrides.api_url, None);
        assert!(!overrides.accept_invalid_certs);
        assert!(!overrides.fail_on_error);
    }

    #[test]
    fn test_cli_flags_parsing() {
        let cli = Cli::try_parse_from([
            "order-sync",
            "--api-url",
            "https://example.test/health",
            "--log-file",
            "/tmp/sync.log",
            "--insecure",
            "--fail-on-error",
        ])
        .unwrap();

        assert_eq!(cli.log_file, PathBuf::from("/tmp/sync.log"));

        let overrides = cli.overrides();
        assert_eq!(
            overrides.api_url.as_deref(),
            Some("https://example.test/health")
        );
        assert!(overrides.accept_invalid_certs);
        assert!(overrides.fail_on_error);
    }

    #[test]
    fn test_cli_rejects_positional_arguments() {
        let result = Cli::try_parse_from(["order-sync", "https://example.test/health"]);
        assert!(result.is_err());
    }
}
