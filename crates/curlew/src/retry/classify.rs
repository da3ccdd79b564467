//! Classify HTTP statuses, curl errors, and body I/O errors for retry policy.

use std::io;

use crate::error::Error;

/// High-level classification of an attempt's failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (429).
    Throttled,
    /// Network-level failure: reset, aborted, broken pipe, truncated stream.
    Connection,
    /// Retryable server-side HTTP status (500 and anything above 501).
    Http5xx(u16),
    /// Any other error. Not retried: assume an unrecoverable client-side or
    /// protocol problem.
    Other,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// Classify an HTTP status code. Success codes are `Other`: whether a 2xx is
/// good enough is the caller's business, not the retry policy's.
pub fn classify_status(code: u16) -> ErrorKind {
    match code {
        429 => ErrorKind::Throttled,
        500 => ErrorKind::Http5xx(500),
        501 => ErrorKind::Other,
        c if c > 501 => ErrorKind::Http5xx(c),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl transport error.
///
/// Only mid-transfer failures (reset, broken pipe, truncated stream) count
/// as `Connection`. Connection-refused and DNS/proxy resolution failures are
/// `Other`: the endpoint is unreachable or misnamed, not flaky.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_recv_error() || e.is_send_error() || e.is_got_nothing() || e.is_partial_file() {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify an I/O error seen while reading a body.
pub fn classify_io_error(e: &io::Error) -> ErrorKind {
    match e.kind() {
        io::ErrorKind::TimedOut => ErrorKind::Timeout,
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

/// Classify any send error.
pub fn classify(e: &Error) -> ErrorKind {
    match e {
        Error::Transport(ce) => classify_curl_error(ce),
        Error::Body(ioe) => classify_io_error(ioe),
        Error::RegenerateBody { .. } | Error::Url(_) | Error::Cancelled => ErrorKind::Other,
    }
}
