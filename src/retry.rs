use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis() as u64,
        }
    }

    /// Policy that never sleeps between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// The closure receives the 1-based attempt number. Every failure is
    /// logged with `context`; the error of the final attempt is returned.
    /// There is no sleep after the final attempt. A policy with zero
    /// attempts still runs the operation once.
    pub async fn run<T, E, F>(&self, context: &str, mut op: F) -> Result<T, E>
    where
        F: AsyncFnMut(u32) -> Result<T, E>,
        E: Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    ::log::error!(
                        "{} failed (attempt {}/{}): {}",
                        context,
                        attempt,
                        attempts,
                        e
                    );

                    if attempt >= attempts {
                        ::log::error!("{} failed after {} attempts", context, attempts);
                        return Err(e);
                    }

                    ::log::info!(
                        "Retrying {} in {:.1} seconds...",
                        context,
                        self.delay().as_secs_f64()
                    );
                    tokio::time::sleep(self.delay()).await;
                    attempt += 1;
                }
            }
        }
    }
}
