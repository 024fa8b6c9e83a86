//! Classification of a single request's outcome.

use reqwest::StatusCode;
use std::fmt;

/// Outcome of one GET attempt.
#[derive(Debug)]
pub enum AttemptResult {
    /// The endpoint answered with a 2xx status.
    Success(StatusCode),
    /// A transient network or HTTP failure; another attempt may succeed.
    Retryable(anyhow::Error),
    /// A failure that no amount of retrying will fix.
    Fatal(anyhow::Error),
}

impl AttemptResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptResult::Success(_))
    }
}

/// The endpoint responded, but not with a 2xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnexpectedStatus(pub StatusCode);

impl fmt::Display for UnexpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP status {}", self.0)
    }
}

impl std::error::Error for UnexpectedStatus {}

/// Maps a response status to an attempt outcome.
pub fn classify_status(status: StatusCode) -> AttemptResult {
    if status.is_success() {
        AttemptResult::Success(status)
    } else {
        AttemptResult::Retryable(anyhow::Error::from(UnexpectedStatus(status)))
    }
}

/// Maps a reqwest error to an attempt outcome.
///
/// Builder errors mean the request could never have been sent (bad URL,
/// unsupported scheme) and are fatal. Everything else reqwest reports comes
/// from the transport or the response: connection refused, DNS, timeouts,
/// redirects, bodies, statuses. Those are retried.
pub fn classify_error(error: reqwest::Error) -> AttemptResult {
    if error.is_builder() {
        return AttemptResult::Fatal(anyhow::Error::from(error).context("Invalid request"));
    }

    AttemptResult::Retryable(anyhow::Error::from(error))
}
