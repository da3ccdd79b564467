//! Thin client facade: a doer stack assembled from configuration.

use crate::config::ClientConfig;
use crate::doer::Doer;
use crate::error::Error;
use crate::request::{Method, Request};
use crate::response::Response;
use crate::retry::Retry;
use crate::transport::CurlDoer;

/// An HTTP client: a [`Doer`] stack behind a convenience surface.
///
/// The default client is a [`CurlDoer`] wrapped in [`Retry`] with default
/// settings. Any doer (including further middleware layers) can be installed
/// via [`Client::with_doer`].
pub struct Client {
    doer: Box<dyn Doer>,
}

impl Client {
    /// Curl transport with the default retry policy.
    pub fn new() -> Self {
        Self::with_doer(Retry::with_defaults(CurlDoer::default()))
    }

    /// Use an arbitrary doer stack.
    pub fn with_doer(doer: impl Doer + 'static) -> Self {
        Self {
            doer: Box::new(doer),
        }
    }

    /// Assemble a client from configuration: curl options from `[http]`,
    /// plus a retry layer when a `[retry]` section is present.
    pub fn from_config(config: &ClientConfig) -> Self {
        let transport = CurlDoer::new(config.http.to_curl_options());
        match &config.retry {
            Some(retry) => Self::with_doer(Retry::new(transport, retry.to_retry_config())),
            None => Self::with_doer(transport),
        }
    }

    /// Execute a prepared request through the doer stack.
    pub fn execute(&self, req: &mut Request) -> Result<Response, Error> {
        self.doer.send(req)
    }

    /// Convenience GET.
    pub fn get(&self, url: &str) -> Result<Response, Error> {
        let mut req = Request::new(Method::Get, url)?;
        self.execute(&mut req)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Doer for Client {
    fn send(&self, req: &mut Request) -> Result<Response, Error> {
        self.execute(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrySettings;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn executes_through_installed_doer() {
        let sends = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&sends);
        let client = Client::with_doer(move |_req: &mut Request| -> Result<Response, Error> {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(Response::new(204))
        });

        let mut req = Request::new(Method::Get, "http://test.com/").unwrap();
        let resp = client.execute(&mut req).unwrap();
        assert_eq!(resp.status(), 204);
        assert_eq!(sends.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn from_config_builds_without_retry_section() {
        let config = ClientConfig::default();
        assert!(config.retry.is_none());
        let _client = Client::from_config(&config);
    }

    #[test]
    fn from_config_builds_with_retry_section() {
        let config = ClientConfig {
            retry: Some(RetrySettings::default()),
            ..ClientConfig::default()
        };
        let _client = Client::from_config(&config);
    }
}
