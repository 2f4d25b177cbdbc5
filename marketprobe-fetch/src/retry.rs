//! Backoff policies and attempt budgets.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// Backoff Policy
// ============================================================================

/// Delay between attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffPolicy {
    /// No delay at all.
    None,
    /// A random delay drawn uniformly from `min_ms..=max_ms`.
    Jitter {
        /// Lower bound in milliseconds.
        min_ms: u64,
        /// Upper bound in milliseconds.
        max_ms: u64,
    },
    /// `base_ms * 2^(attempt-1)`, capped at `max_ms`, optionally scaled by
    /// a random factor in `0.75..=1.25`.
    Exponential {
        /// Delay after the first attempt in milliseconds.
        base_ms: u64,
        /// Upper bound in milliseconds.
        max_ms: u64,
        /// Whether to apply random jitter.
        #[serde(default)]
        jitter: bool,
    },
}

impl BackoffPolicy {
    /// Small random pause between attempts.
    pub fn jitter(min_ms: u64, max_ms: u64) -> Self {
        Self::Jitter { min_ms, max_ms }
    }

    /// Exponential backoff with jitter.
    pub fn exponential(base_ms: u64, max_ms: u64) -> Self {
        Self::Exponential {
            base_ms,
            max_ms,
            jitter: true,
        }
    }

    /// Calculates the delay after a given attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.delay_for_attempt_with(attempt, &mut rand::thread_rng())
    }

    /// Calculates the delay after a given attempt using the given RNG.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn delay_for_attempt_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Jitter { min_ms, max_ms } => {
                let (low, high) = if min_ms <= max_ms {
                    (min_ms, max_ms)
                } else {
                    (max_ms, min_ms)
                };
                Duration::from_millis(rng.gen_range(low..=high))
            }
            Self::Exponential {
                base_ms,
                max_ms,
                jitter,
            } => {
                let exponent = attempt.saturating_sub(1).min(32);
                let delay = base_ms.saturating_mul(2u64.saturating_pow(exponent)).min(max_ms);
                let delay = if jitter {
                    ((delay as f64) * rng.gen_range(0.75..=1.25)) as u64
                } else {
                    delay
                };
                Duration::from_millis(delay.min(max_ms))
            }
        }
    }

    /// Blocks the calling thread for the delay after `attempt`.
    pub fn wait(&self, attempt: u32) {
        let delay = self.delay_for_attempt(attempt);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::jitter(500, 1500)
    }
}

// ============================================================================
// Attempt Budget
// ============================================================================

/// Counter shared by every attempt of one logical operation.
///
/// Nested refreshes draw from the same budget, so the total number of
/// attempts never exceeds the limit no matter how often a refresh is
/// triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptBudget {
    limit: u32,
    used: u32,
}

impl AttemptBudget {
    /// Creates a budget of `limit` attempts.
    pub fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    /// Consumes one attempt, returning its 1-based number.
    pub fn try_take(&mut self) -> Option<u32> {
        if self.used >= self.limit {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    /// Attempts consumed so far.
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Attempts still available.
    pub fn remaining(&self) -> u32 {
        self.limit - self.used
    }

    /// Returns true once every attempt has been used.
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

// ============================================================================
// Tests
// ============================================================================
