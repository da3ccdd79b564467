//! Error type shared by doers, the retry middleware, and the client facade.

use thiserror::Error;

/// Error returned by a single send (transport failure, body failure, or
/// cancellation). Retry decisions classify these via [`crate::retry::classify`]
/// before deciding whether another attempt is worthwhile.
#[derive(Debug, Error)]
pub enum Error {
    /// libcurl reported an error (timeout, connection, protocol, etc.).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// Reading a request or response body failed.
    #[error("reading body: {0}")]
    Body(#[source] std::io::Error),

    /// The request body regenerator failed while rewinding for a retry.
    /// Fatal to the retry loop; never retried itself. `last_status` carries
    /// the HTTP status of the attempt being retried, when it produced one.
    #[error("regenerating request body: {source}")]
    RegenerateBody {
        #[source]
        source: std::io::Error,
        last_status: Option<u16>,
    },

    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request's cancel token fired.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// True if this error is the cancellation sentinel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
