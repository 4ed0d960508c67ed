//! A minimum-inter-send-interval limiter.
//!
//! The source `lading_throttle` crate itself was not present in the
//! retrieval pack, but its call sites were: `Throttle::new_with_config(cfg,
//! rate)` at construction and `self.throttle.wait_for(n).await` inside a
//! `tokio::select!` at the send site (see `lading/src/generator/unix_datagram.rs`).
//! This crate re-derives that shape for the simpler rule the hub actually
//! needs -- spec §4.2's "minimum inter-send interval (~10 ms)" between UDP
//! sends and §4.7's "minimum interval between worker dispatches" -- a fixed
//! minimum gap between events rather than a token-bucket byte rate.

use std::time::Duration;

use tokio::time::Instant;

/// Configuration for a [`Throttle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub min_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_interval: Duration::from_millis(10),
        }
    }
}

/// Enforces a minimum wall-clock gap between successive calls to
/// [`Throttle::wait`].
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Throttle {
            min_interval,
            last: None,
        }
    }

    #[must_use]
    pub fn new_with_config(config: Config) -> Self {
        Self::new(config.min_interval)
    }

    /// Sleeps, if necessary, so that at least `min_interval` has elapsed
    /// since the previous call returned, then records the new baseline.
    pub async fn wait(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }

    /// Returns the remaining wait, if any, without sleeping or updating
    /// state. Useful for a non-blocking readiness check.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => {
                let elapsed = Instant::now().saturating_duration_since(last);
                self.min_interval.saturating_sub(elapsed)
            }
        }
    }
}
