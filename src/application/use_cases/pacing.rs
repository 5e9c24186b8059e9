//! Pacing for outbound oracle calls
//!
//! The lookup service has no published rate limit, so calls are spaced by a
//! configurable policy:
//! - `none`: no delay
//! - `fixed`: minimum interval between the start of consecutive calls
//! - `token_bucket`: bursts up to `capacity`, then `refill_per_sec`

use crate::domain::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

/// Slowest accepted refill, one token every ~17 minutes
pub const MIN_REFILL_PER_SEC: f64 = 0.001;

/// Longest single wait the pacer will ask for
const MAX_WAIT: Duration = Duration::from_secs(1000);

/// Pacing policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PacingPolicy {
    None,
    Fixed { delay_ms: u64 },
    TokenBucket { capacity: u32, refill_per_sec: f64 },
}

impl Default for PacingPolicy {
    fn default() -> Self {
        PacingPolicy::Fixed { delay_ms: 1000 }
    }
}

impl PacingPolicy {
    pub fn validate(&self) -> Result<()> {
        match self {
            PacingPolicy::TokenBucket { capacity, .. } if *capacity == 0 => Err(
                AppError::ConfigError("pacing.capacity must be at least 1".to_string()),
            ),
            PacingPolicy::TokenBucket { refill_per_sec, .. }
                if !(refill_per_sec.is_finite() && *refill_per_sec >= MIN_REFILL_PER_SEC) =>
            {
                Err(AppError::ConfigError(format!(
                    "pacing.refill_per_sec must be at least {}",
                    MIN_REFILL_PER_SEC
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Stateful pacer for one batch run
pub struct Pacer {
    policy: PacingPolicy,
    last_call: Option<Instant>,
    tokens: f64,
    last_refill: Instant,
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        let tokens = match &policy {
            PacingPolicy::TokenBucket { capacity, .. } => *capacity as f64,
            _ => 0.0,
        };
        Self {
            policy,
            last_call: None,
            tokens,
            last_refill: Instant::now(),
        }
    }

    /// Wait until the next call is allowed
    pub async fn wait(&mut self) {
        let delay = self.reserve(Instant::now());
        if !delay.is_zero() {
            trace!(delay_ms = delay.as_millis() as u64, "Pacing oracle call");
            tokio::time::sleep(delay).await;
        }
    }

    /// Claim a call slot at `now` and return how long to wait before using it
    fn reserve(&mut self, now: Instant) -> Duration {
        match self.policy {
            PacingPolicy::None => Duration::ZERO,
            PacingPolicy::Fixed { delay_ms } => {
                let interval = Duration::from_millis(delay_ms);
                let wait = match self.last_call {
                    Some(last) => interval.saturating_sub(now.saturating_duration_since(last)),
                    None => Duration::ZERO,
                };
                self.last_call = Some(later(now, wait));
                wait
            }
            PacingPolicy::TokenBucket {
                capacity,
                refill_per_sec,
            } => {
                let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
                self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity as f64);
                self.last_refill = now;

                if self.tokens >= 1.0 {
                    self.tokens -= 1.0;
                    return Duration::ZERO;
                }

                let wait = Duration::try_from_secs_f64((1.0 - self.tokens) / refill_per_sec)
                    .map_or(MAX_WAIT, |wait| wait.min(MAX_WAIT));
                self.tokens = 0.0;
                self.last_refill = later(now, wait);
                self.last_call = Some(self.last_refill);
                wait
            }
        }
    }
}

fn later(now: Instant, wait: Duration) -> Instant {
    now.checked_add(wait).unwrap_or(now)
}
