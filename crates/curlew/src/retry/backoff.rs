//! Backoff policies: attempt number in, wait duration out.

use std::time::Duration;

use rand::Rng;

/// Calculates how long to wait between attempts. `attempt` is the attempt
/// which just completed, and starts at 1: `backoff(1)` is the wait between
/// attempts 1 and 2.
pub trait Backoffer: Send + Sync {
    fn backoff(&self, attempt: u32) -> Duration;
}

impl<F> Backoffer for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn backoff(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Exponential backoff with jitter, after the grpc implementation.
///
/// A zero value waits nothing between retries. A bare `base_delay` gives a
/// fixed delay; adding `jitter` randomizes it; `multiplier > 0` grows it
/// geometrically; `max_delay > 0` caps it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    /// Wait after the first failure.
    pub base_delay: Duration,
    /// Growth factor applied per subsequent attempt. `<= 0` means no growth:
    /// the delay stays fixed at `base_delay`.
    pub multiplier: f64,
    /// Randomization factor, ideally < 1. The computed delay is multiplied by
    /// a uniform factor in `[1 - jitter, 1 + jitter]`. If jitter would push
    /// the delay above `max_delay`, the excess is redistributed below the
    /// cap. 0 means no jitter.
    pub jitter: f64,
    /// Upper bound on the delay. 0 means no bound.
    pub max_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 1.6,
            jitter: 0.2,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl ExponentialBackoff {
    /// No wait at all between retries.
    pub fn none() -> Self {
        Self {
            base_delay: Duration::ZERO,
            multiplier: 0.0,
            jitter: 0.0,
            max_delay: Duration::ZERO,
        }
    }

    /// A fixed, constant delay between retries, no jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            ..Self::none()
        }
    }

    /// A fixed, constant delay between retries with 20% jitter.
    pub fn constant_with_jitter(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            jitter: 0.2,
            ..Self::none()
        }
    }
}

impl Backoffer for ExponentialBackoff {
    fn backoff(&self, attempt: u32) -> Duration {
        let mut backoff = self.base_delay.as_secs_f64();

        if self.multiplier > 0.0 {
            let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
            backoff *= self.multiplier.powi(exp);
        }

        let max_delay = self.max_delay.as_secs_f64();
        if !self.max_delay.is_zero() {
            backoff = backoff.min(max_delay);
        }
        backoff = backoff.max(0.0);

        if self.jitter > 0.0 {
            backoff *= 1.0 + self.jitter * (rand::thread_rng().gen::<f64>() * 2.0 - 1.0);
            if !self.max_delay.is_zero() {
                let delta = backoff - max_delay;
                if delta > 0.0 {
                    // jitter bumped the delay above the cap; redistribute below it
                    backoff = max_delay - delta;
                }
            }
        }

        Duration::try_from_secs_f64(backoff).unwrap_or(Duration::ZERO)
    }
}
