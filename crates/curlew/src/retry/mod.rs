//! Retry with backoff.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures), pluggable retry predicates, backoff policies with
//! jitter, and the [`Retry`] middleware that drives repeated attempts through
//! an inner [`Doer`](crate::doer::Doer) while draining abandoned response
//! bodies and honoring cancellation.

mod backoff;
mod classify;
mod middleware;
mod policy;

pub use backoff::{Backoffer, ExponentialBackoff};
pub use classify::{classify, classify_curl_error, classify_io_error, classify_status, ErrorKind};
pub use middleware::Retry;
pub use policy::{all_of, DefaultShouldRetry, OnlyIdempotent, RetryConfig, ShouldRetryer};
