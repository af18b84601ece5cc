//! Fixed-delay retry budget with an injectable sleep, so retry exhaustion can be exercised
//! without waiting on the wall clock.
use async_trait::async_trait;
use std::fmt::Display;
use std::iter::Take;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers every delay it was asked for.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.delays().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}

pub struct RetryBudget {
    schedule: Take<FixedInterval>,
    remaining: u32,
}

impl RetryBudget {
    pub fn new(delay: Duration, max_retries: u32) -> Self {
        Self {
            schedule: FixedInterval::new(delay).take(max_retries as usize),
            remaining: max_retries,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Spends one retry and returns the delay to wait before it, or `None` once exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.schedule.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(delay)
    }
}

/// User-facing retry line. `Duration`'s debug form keeps sub-second delays readable.
pub fn retry_notice(action: &str, err: &impl Display, delay: Duration, remaining: u32) -> String {
    format!("{action} failed ({err}), retrying in {delay:?} ({remaining} retries left)")
}
