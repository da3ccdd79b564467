//! Per-request cancellation: shared cancel tokens.
//!
//! A `CancelToken` is attached to each request. The retry middleware waits on
//! it between attempts so a backoff sleep can be aborted promptly; the curl
//! transport polls it from its progress callback so an in-flight transfer can
//! be torn down.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct Inner {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable cancellation handle shared between a caller and a request.
///
/// Clones observe the same underlying flag. Cancellation is sticky: once
/// fired, every subsequent wait returns immediately.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Wakes any thread blocked in [`wait_timeout`].
    ///
    /// [`wait_timeout`]: CancelToken::wait_timeout
    pub fn cancel(&self) {
        let mut cancelled = self.lock();
        *cancelled = true;
        self.inner.cond.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    // A poisoned lock just means a panicking thread held it; the flag is
    // still meaningful, so recover the guard.
    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`, returning early if cancellation fires.
    /// Returns true if the token was cancelled, false if the timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        // checked_add: an absurdly large backoff (no max delay configured)
        // must not overflow Instant math. None means wait until cancelled.
        let deadline = std::time::Instant::now().checked_add(timeout);
        let mut cancelled = self.lock();
        loop {
            if *cancelled {
                return true;
            }
            let remaining = match deadline {
                Some(d) => match d.checked_duration_since(std::time::Instant::now()) {
                    Some(r) if !r.is_zero() => r,
                    _ => return false,
                },
                None => Duration::from_secs(3600),
            };
            let (guard, _wait) = self
                .inner
                .cond
                .wait_timeout(cancelled, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
