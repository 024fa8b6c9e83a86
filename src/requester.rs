//! The bounded retry loop around a single GET.

use anyhow::{Result, bail};
use log::{error, info};
use std::fmt;

use crate::config::Config;
use crate::http::{AttemptResult, Probe};
use crate::runtime::Runtime;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// An attempt got a 2xx response.
    Succeeded { attempt: u32 },
    /// Every attempt failed with a retryable error.
    Exhausted { attempts: u32 },
    /// An attempt failed in a way retrying cannot fix.
    Aborted { attempt: u32, error: anyhow::Error },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }

    /// Number of attempts made before the run ended.
    pub fn attempts(&self) -> u32 {
        match self {
            RunOutcome::Succeeded { attempt } => *attempt,
            RunOutcome::Exhausted { attempts } => *attempts,
            RunOutcome::Aborted { attempt, .. } => *attempt,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Succeeded { attempt } => write!(f, "succeeded on attempt {}", attempt),
            RunOutcome::Exhausted { attempts } => {
                write!(f, "failed after {} attempts", attempts)
            }
            RunOutcome::Aborted { attempt, error } => {
                write!(f, "aborted on attempt {}: {:#}", attempt, error)
            }
        }
    }
}

/// Drives up to `max_retries` attempts against the configured URL, sleeping
/// `retry_delay` between retryable failures.
///
/// Attempts are strictly sequential: attempt `i + 1` starts only after the
/// delay following attempt `i` has elapsed.
pub struct RetryingRequester<'a, R: Runtime, P: Probe> {
    runtime: &'a R,
    probe: &'a P,
    config: &'a Config,
}

impl<'a, R: Runtime, P: Probe> RetryingRequester<'a, R, P> {
    pub fn new(runtime: &'a R, probe: &'a P, config: &'a Config) -> Self {
        Self {
            runtime,
            probe,
            config,
        }
    }

    pub async fn run(&self) -> RunOutcome {
        let max_retries = self.config.max_retries;
        let delay = self.config.retry_delay;

        for attempt in 1..=max_retries {
            match self.probe.attempt(&self.config.api_url).await {
                AttemptResult::Success(status) => {
                    info!(
                        "Request successful on attempt {}/{} ({})",
                        attempt, max_retries, status
                    );
                    return RunOutcome::Succeeded { attempt };
                }
                AttemptResult::Retryable(e) => {
                    error!(
                        "Error during request (attempt {}/{}): {:#}",
                        attempt, max_retries, e
                    );
                    if attempt < max_retries {
                        info!("Retrying in {} seconds...", delay.as_secs());
                        self.runtime.sleep(delay).await;
                    }
                }
                AttemptResult::Fatal(e) => {
                    error!(
                        "Unexpected error on attempt {}/{}, not retrying: {:#}",
                        attempt, max_retries, e
                    );
                    return RunOutcome::Aborted { attempt, error: e };
                }
            }
        }

        error!(
            "Failed to reach {} after {} attempts",
            self.config.api_url, max_retries
        );
        RunOutcome::Exhausted {
            attempts: max_retries,
        }
    }
}

/// Runs one sync: the retry loop framed by start/finish log lines.
///
/// Exhaustion and aborts are only logged unless `fail_on_error` is set, in
/// which case they are returned as an error.
pub async fn sync<R: Runtime, P: Probe>(
    runtime: &R,
    probe: &P,
    config: &Config,
) -> Result<RunOutcome> {
    info!("Beginning sync against {}...", config.api_url);

    let outcome = RetryingRequester::new(runtime, probe, config).run().await;

    info!("Sync finished: {}", outcome);

    if config.fail_on_error && !outcome.is_success() {
        bail!("Sync {}", outcome);
    }
    Ok(outcome)
}
