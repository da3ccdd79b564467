//! The doer seam: send one request, get one response or error.
//!
//! Middleware such as [`crate::retry::Retry`] both consumes a doer (the inner
//! transport) and implements one, so layers stack by wrapping.

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// Executes a single HTTP request.
///
/// The request is passed mutably: transports consume streamed bodies out of
/// it and the retry middleware rewinds them between attempts.
pub trait Doer: Send + Sync {
    fn send(&self, req: &mut Request) -> Result<Response, Error>;
}

impl<F> Doer for F
where
    F: Fn(&mut Request) -> Result<Response, Error> + Send + Sync,
{
    fn send(&self, req: &mut Request) -> Result<Response, Error> {
        self(req)
    }
}

impl Doer for Box<dyn Doer> {
    fn send(&self, req: &mut Request) -> Result<Response, Error> {
        (**self).send(req)
    }
}

impl Doer for std::sync::Arc<dyn Doer> {
    fn send(&self, req: &mut Request) -> Result<Response, Error> {
        (**self).send(req)
    }
}
