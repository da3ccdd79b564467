//! Retry predicates and the retry middleware configuration.

use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

use super::backoff::{Backoffer, ExponentialBackoff};
use super::classify::{classify, classify_status};

/// Evaluates whether a completed attempt should be retried. `attempt` is the
/// number of the attempt which just finished, starting at 1: returning true
/// for `attempt = 1` means attempt 2 should be tried.
pub trait ShouldRetryer: Send + Sync {
    fn should_retry(
        &self,
        attempt: u32,
        req: &Request,
        outcome: &Result<Response, Error>,
    ) -> bool;
}

impl<F> ShouldRetryer for F
where
    F: Fn(u32, &Request, &Result<Response, Error>) -> bool + Send + Sync,
{
    fn should_retry(
        &self,
        attempt: u32,
        req: &Request,
        outcome: &Result<Response, Error>,
    ) -> bool {
        self(attempt, req, outcome)
    }
}

/// The default retry predicate.
///
/// Responses are retried on status 429, 500, or anything above 501 (501 Not
/// Implemented is permanent). Errors are retried when they classify as
/// timeouts or connection-level failures; anything else is assumed to be an
/// unrecoverable client-side or protocol error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShouldRetry;

impl ShouldRetryer for DefaultShouldRetry {
    fn should_retry(
        &self,
        _attempt: u32,
        _req: &Request,
        outcome: &Result<Response, Error>,
    ) -> bool {
        match outcome {
            Ok(resp) => classify_status(resp.status()).is_retryable(),
            Err(e) => classify(e).is_retryable(),
        }
    }
}

/// Retries only requests using idempotent HTTP methods (GET, HEAD, OPTIONS,
/// TRACE). Meant to be combined with other criteria via [`all_of`]:
///
/// ```
/// use curlew::retry::{all_of, DefaultShouldRetry, OnlyIdempotent};
///
/// let retryer = all_of(vec![
///     Box::new(DefaultShouldRetry),
///     Box::new(OnlyIdempotent),
/// ]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyIdempotent;

impl ShouldRetryer for OnlyIdempotent {
    fn should_retry(
        &self,
        _attempt: u32,
        req: &Request,
        _outcome: &Result<Response, Error>,
    ) -> bool {
        req.method().is_idempotent()
    }
}

struct AllOf(Vec<Box<dyn ShouldRetryer>>);

impl ShouldRetryer for AllOf {
    fn should_retry(
        &self,
        attempt: u32,
        req: &Request,
        outcome: &Result<Response, Error>,
    ) -> bool {
        self.0
            .iter()
            .all(|r| r.should_retry(attempt, req, outcome))
    }
}

/// Combine retryers with logical AND: retry only if every retryer agrees.
pub fn all_of(retryers: Vec<Box<dyn ShouldRetryer>>) -> impl ShouldRetryer {
    AllOf(retryers)
}

/// Settings for the [`Retry`](super::Retry) middleware.
///
/// Policy objects are shared read-only across every call through the
/// middleware; per-call state (attempt counter, live request and response)
/// never leaves the calling thread's stack.
#[derive(Clone)]
pub struct RetryConfig {
    /// Number of times to attempt the request, including the first.
    /// Values below 1 are normalized to the default of 3.
    pub max_attempts: u32,
    /// Predicate deciding whether a completed attempt is retried.
    pub should_retry: Arc<dyn ShouldRetryer>,
    /// Wait policy between attempts.
    pub backoff: Arc<dyn Backoffer>,
    /// Read the entire response body before considering an attempt done, so
    /// mid-body failures are visible to the retry predicate.
    pub read_response: bool,
    /// Cap on the bytes read from an abandoned response body before dropping
    /// it. Heuristic for connection reuse, not correctness.
    pub drain_limit: u64,
}

pub(super) const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub(super) const DEFAULT_DRAIN_LIMIT: u64 = 4096;

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            should_retry: Arc::new(DefaultShouldRetry),
            backoff: Arc::new(ExponentialBackoff::default()),
            read_response: false,
            drain_limit: DEFAULT_DRAIN_LIMIT,
        }
    }
}

impl RetryConfig {
    pub(super) fn normalize(mut self) -> Self {
        if self.max_attempts < 1 {
            self.max_attempts = DEFAULT_MAX_ATTEMPTS;
        }
        self
    }
}

impl std::fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_attempts", &self.max_attempts)
            .field("read_response", &self.read_response)
            .field("drain_limit", &self.drain_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    fn req(method: Method) -> Request {
        Request::new(method, "http://test.com/").unwrap()
    }

    fn status_outcome(code: u16) -> Result<Response, Error> {
        Ok(Response::new(code))
    }

    #[test]
    fn default_retries_on_server_errors() {
        let r = DefaultShouldRetry;
        let req = req(Method::Get);
        assert!(!r.should_retry(1, &req, &status_outcome(400)));
        assert!(r.should_retry(1, &req, &status_outcome(500)));
        assert!(!r.should_retry(1, &req, &status_outcome(501)));
        assert!(r.should_retry(1, &req, &status_outcome(502)));
        assert!(r.should_retry(1, &req, &status_outcome(429)));
        assert!(!r.should_retry(1, &req, &status_outcome(200)));
    }

    #[test]
    fn default_retries_on_retryable_errors() {
        let r = DefaultShouldRetry;
        let req = req(Method::Get);
        let reset = Err(Error::Body(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(r.should_retry(1, &req, &reset));

        let eof = Err(Error::Body(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        )));
        assert!(r.should_retry(1, &req, &eof));

        let other = Err(Error::Body(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad",
        )));
        assert!(!r.should_retry(1, &req, &other));

        assert!(!r.should_retry(1, &req, &Err(Error::Cancelled)));
    }

    #[test]
    fn only_idempotent_checks_method() {
        let r = OnlyIdempotent;
        let outcome = status_outcome(500);
        for method in [Method::Get, Method::Head, Method::Options, Method::Trace] {
            assert!(r.should_retry(1, &req(method), &outcome), "{}", method);
        }
        for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
            assert!(!r.should_retry(1, &req(method), &outcome), "{}", method);
        }
    }

    #[test]
    fn all_of_requires_agreement() {
        let r = all_of(vec![
            Box::new(DefaultShouldRetry),
            Box::new(OnlyIdempotent),
        ]);

        // false + false
        assert!(!r.should_retry(1, &req(Method::Post), &status_outcome(400)));
        // true + false
        assert!(!r.should_retry(1, &req(Method::Post), &status_outcome(500)));
        // false + true
        assert!(!r.should_retry(1, &req(Method::Get), &status_outcome(400)));
        // true + true
        assert!(r.should_retry(1, &req(Method::Get), &status_outcome(500)));
    }

    #[test]
    fn function_adapter() {
        let r = |attempt: u32, _req: &Request, _outcome: &Result<Response, Error>| attempt < 3;
        let request = req(Method::Get);
        assert!(r.should_retry(2, &request, &status_outcome(500)));
        assert!(!r.should_retry(3, &request, &status_outcome(500)));
    }

    #[test]
    fn config_normalizes_max_attempts() {
        let cfg = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert_eq!(cfg.normalize().max_attempts, 3);
    }
}
