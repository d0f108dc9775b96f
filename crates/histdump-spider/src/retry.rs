use rand::Rng;
use std::time::Duration;

/// Delay strategy between two attempts of the same request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed { delay: Duration },

    /// `base * factor^attempt`, capped at `max`; with `jitter`, the delay is
    /// drawn uniformly from 50% to 150% of that value.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay to wait after the failed attempt number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                if base.is_zero() {
                    return Duration::ZERO;
                }
                let exponent = attempt.min(i32::MAX as u32) as i32;
                // a negative or NaN product means no wait
                let seconds = (base.as_secs_f64() * factor.powi(exponent))
                    .min(max.as_secs_f64())
                    .max(0.0);
                let delay = Duration::from_secs_f64(seconds);

                if jitter {
                    let millis = delay.as_millis() as u64;
                    let spread = millis / 2;
                    let offset = rand::thread_rng().gen_range(0..=spread * 2);
                    Duration::from_millis(millis - spread + offset)
                } else {
                    delay
                }
            }
        }
    }
}

/// Bounded retry budget for fetching a single page.
///
/// A response counts as failed when the client returns nothing (dead proxy,
/// timeout) or the status is anything but `200 OK`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first; never less than 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Retry immediately, `max_attempts` times; useful against local or mocked upstreams.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(
            max_attempts,
            Backoff::Fixed {
                delay: Duration::ZERO,
            },
        )
    }

    /// Whether another attempt is allowed after `attempts` have been spent.
    pub fn can_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts.max(1)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
