//! curlew: an ergonomic HTTP client facade over libcurl.
//!
//! The crate composes a plain transport ([`transport::CurlDoer`]) with
//! client-side middleware through a single seam, the [`Doer`] trait. The
//! centerpiece is [`retry::Retry`]: retry-with-backoff middleware that
//! replays requests with regenerable bodies, drains abandoned response
//! bodies so connections can be reused, and honors cancellation during
//! backoff waits.

pub mod cancel;
pub mod client;
pub mod config;
pub mod doer;
pub mod error;
pub mod logging;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;

pub use cancel::CancelToken;
pub use client::Client;
pub use doer::Doer;
pub use error::Error;
pub use request::{Body, Method, Request};
pub use response::{Response, ResponseBody};
pub use retry::{Backoffer, ExponentialBackoff, Retry, RetryConfig, ShouldRetryer};
