/// Waiting on remote state with a deadline
use anyhow::Result;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long and how often to check a condition
pub struct Poller {
    pub timeout: Duration,
    pub interval: Duration,
    pub description: String,
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration, description: impl Into<String>) -> Self {
        Self {
            timeout,
            interval,
            description: description.into(),
        }
    }

    /// Poll until the condition yields a value or the deadline passes
    ///
    /// The condition function should return:
    /// - Ok(Some(T)) when done (returns T)
    /// - Ok(None) to keep waiting
    /// - Err(e) to stop and return the error
    pub async fn until<F, Fut, T>(&self, mut condition: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        info!("{}...", self.description);

        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if let Some(value) = condition().await? {
                info!("✓ {}", self.description);
                return Ok(value);
            }

            if start.elapsed() > self.timeout {
                anyhow::bail!(
                    "Timed out after {:?} ({} attempts): {}",
                    self.timeout,
                    attempt,
                    self.description
                );
            }

            debug!("{}: attempt {} not done yet", self.description, attempt);
            tokio::time::sleep(self.interval).await;
        }
    }
}
