//! Runtime abstraction for process-level operations.
//!
//! The retry loop never touches the environment or the clock directly; it
//! goes through [`Runtime`] so tests can inject variables and observe sleeps
//! without waiting on them.
//!
//! # Structure
//!
//! - `env` - Environment variables
//! - `time` - Delays between attempts

mod env;
mod time;

use async_trait::async_trait;
use std::env as std_env;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // Time
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration).await
    }
}
