//! The retry middleware: drives repeated attempts through an inner doer.

use crate::doer::Doer;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

use super::policy::RetryConfig;

/// Wraps a [`Doer`] with retry behavior.
///
/// Attempts are strictly sequential. Between attempts the abandoned response
/// body is drained (bounded) and dropped so the underlying connection can be
/// reused, the request body is rewound via its regenerator, and the backoff
/// wait races the request's cancel token. Requests whose body cannot be
/// regenerated are passed through and sent exactly once.
///
/// The final attempt's outcome is returned verbatim: a caller cannot tell
/// from the return value whether zero or several retries occurred.
pub struct Retry<D> {
    inner: D,
    config: RetryConfig,
}

impl<D: Doer> Retry<D> {
    pub fn new(inner: D, config: RetryConfig) -> Self {
        Self {
            inner,
            config: config.normalize(),
        }
    }

    /// Wrap with the default config: 3 attempts, default predicate, default
    /// exponential backoff.
    pub fn with_defaults(inner: D) -> Self {
        Self::new(inner, RetryConfig::default())
    }
}

impl<D: Doer> Doer for Retry<D> {
    fn send(&self, req: &mut Request) -> Result<Response, Error> {
        // A body we can't regenerate can't be re-sent: a second attempt would
        // upload an exhausted stream. Pass straight through.
        if !req.is_replayable() {
            tracing::debug!(url = %req.url(), "request body is not replayable; retry disabled");
            return self.inner.send(req);
        }

        let mut attempt: u32 = 0;
        loop {
            let mut outcome = self.inner.send(req);
            attempt += 1;

            // Optionally read the whole response up front so a mid-body
            // failure counts as this attempt's error instead of surfacing
            // later, invisible to the retry predicate.
            if self.config.read_response {
                if let Ok(resp) = &mut outcome {
                    if let Err(e) = resp.body_mut().buffer() {
                        outcome = Err(Error::Body(e));
                    }
                }
            }

            if attempt >= self.config.max_attempts
                || !self
                    .config
                    .should_retry
                    .should_retry(attempt, req, &outcome)
            {
                return outcome;
            }

            // Consumer responsibilities before abandoning this attempt: drain
            // and drop the response body so keep-alive connections can be
            // reused. Errors here are hygiene, not correctness.
            let last_status = match outcome {
                Ok(resp) => {
                    let status = resp.status();
                    tracing::debug!(attempt, status, "retrying request");
                    resp.into_body().drain(self.config.drain_limit);
                    Some(status)
                }
                Err(ref e) => {
                    tracing::debug!(attempt, error = %e, "retrying request");
                    None
                }
            };

            // Regeneration failure is fatal to the whole operation; it is
            // never itself retried. The abandoned attempt's status rides
            // along so the caller keeps some of its outcome.
            if let Err(e) = req.rewind_body() {
                return Err(match e {
                    Error::RegenerateBody { source, .. } => Error::RegenerateBody {
                        source,
                        last_status,
                    },
                    other => other,
                });
            }

            let delay = self.config.backoff.backoff(attempt);
            if req.cancel_token().wait_timeout(delay) {
                return Err(Error::Cancelled);
            }
        }
    }
}
