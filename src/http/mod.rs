//! The single GET attempt the retry loop drives.

mod client;
pub mod retry;

use async_trait::async_trait;

pub use client::{HttpClient, USER_AGENT};
pub use retry::{AttemptResult, UnexpectedStatus, classify_error, classify_status};

/// One attempt against the endpoint, without any retrying of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Probe: Send + Sync {
    async fn attempt(&self, url: &str) -> AttemptResult;
}
