//! Outbound request model: method, URL, headers, and a replayable body.
//!
//! The body is a tagged union resolved at construction time. In-memory bodies
//! (`Bytes`) are inherently replayable; streamed bodies are replayable only
//! when a regenerator is supplied. The retry middleware checks
//! [`Request::is_replayable`] once up front and bypasses retry entirely for
//! requests it cannot safely re-send.

use std::collections::HashMap;
use std::io::{self, Read};

use url::Url;

use crate::cancel::CancelToken;
use crate::error::Error;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }

    /// The verbs intended to be idempotent, safe to retry without
    /// application-level coordination.
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self,
            Method::Get | Method::Head | Method::Options | Method::Trace
        )
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces a fresh, independent reader over the original request body.
pub type BodyRegenerator = Box<dyn Fn() -> io::Result<Box<dyn Read + Send>> + Send + Sync>;

/// Request body.
pub enum Body {
    /// No body.
    Empty,
    /// In-memory body. Always replayable.
    Bytes(Vec<u8>),
    /// Streamed body. Replayable only if `regenerator` is set; `reader` is
    /// None once the transport has consumed the stream.
    Reader {
        reader: Option<Box<dyn Read + Send>>,
        regenerator: Option<BodyRegenerator>,
    },
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(b) => write!(f, "Body::Bytes({} bytes)", b.len()),
            Body::Reader { reader, regenerator } => write!(
                f,
                "Body::Reader {{ consumed: {}, replayable: {} }}",
                reader.is_none(),
                regenerator.is_some()
            ),
        }
    }
}

/// An outbound HTTP request, immutable per attempt.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HashMap<String, String>,
    body: Body,
    cancel: CancelToken,
}

impl Request {
    /// Build a request with no body. Fails on an unparseable URL.
    pub fn new(method: Method, url: &str) -> Result<Self, Error> {
        Ok(Self {
            method,
            url: Url::parse(url)?,
            headers: HashMap::new(),
            body: Body::Empty,
            cancel: CancelToken::new(),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Set a request header, replacing any previous value for the name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Attach an in-memory body. Replayable across retries.
    pub fn set_body(&mut self, bytes: impl Into<Vec<u8>>) {
        self.body = Body::Bytes(bytes.into());
    }

    /// Attach a streamed body with no regenerator. A request carrying such a
    /// body is sent at most once: the retry middleware passes it through.
    pub fn set_body_reader(&mut self, reader: impl Read + Send + 'static) {
        self.body = Body::Reader {
            reader: Some(Box::new(reader)),
            regenerator: None,
        };
    }

    /// Attach a streamed body along with a regenerator that can produce a
    /// fresh copy of the stream, making the request replayable.
    pub fn set_body_reader_with<F>(&mut self, reader: impl Read + Send + 'static, regenerator: F)
    where
        F: Fn() -> io::Result<Box<dyn Read + Send>> + Send + Sync + 'static,
    {
        self.body = Body::Reader {
            reader: Some(Box::new(reader)),
            regenerator: Some(Box::new(regenerator)),
        };
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Replace the cancel token, e.g. to share one across requests.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    /// Whether the body can be produced again for another attempt. Empty and
    /// in-memory bodies always can; streamed bodies need a regenerator.
    pub fn is_replayable(&self) -> bool {
        match &self.body {
            Body::Empty | Body::Bytes(_) => true,
            Body::Reader { regenerator, .. } => regenerator.is_some(),
        }
    }

    /// Install a fresh body stream ahead of the next attempt. No-op for
    /// empty and in-memory bodies.
    pub(crate) fn rewind_body(&mut self) -> Result<(), Error> {
        if let Body::Reader {
            reader,
            regenerator: Some(regen),
        } = &mut self.body
        {
            *reader = Some(regen().map_err(|e| Error::RegenerateBody {
                source: e,
                last_status: None,
            })?);
        }
        Ok(())
    }

    /// Consume the body into bytes for upload. Streamed bodies are read to
    /// the end and left consumed until [`rewind_body`](Self::rewind_body).
    pub(crate) fn take_body_bytes(&mut self) -> Result<Option<Vec<u8>>, Error> {
        match &mut self.body {
            Body::Empty => Ok(None),
            Body::Bytes(b) => Ok(Some(b.clone())),
            Body::Reader { reader, .. } => match reader.take() {
                Some(mut r) => {
                    let mut buf = Vec::new();
                    r.read_to_end(&mut buf).map_err(Error::Body)?;
                    Ok(Some(buf))
                }
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_methods() {
        assert!(Method::Get.is_idempotent());
        assert!(Method::Head.is_idempotent());
        assert!(Method::Options.is_idempotent());
        assert!(Method::Trace.is_idempotent());
        assert!(!Method::Post.is_idempotent());
        assert!(!Method::Put.is_idempotent());
        assert!(!Method::Patch.is_idempotent());
        assert!(!Method::Delete.is_idempotent());
    }

    #[test]
    fn invalid_url_rejected() {
        assert!(Request::new(Method::Get, "not a url").is_err());
    }

    #[test]
    fn bytes_body_is_replayable() {
        let mut req = Request::new(Method::Post, "http://example.com/").unwrap();
        req.set_body("fudge");
        assert!(req.is_replayable());
        assert_eq!(req.take_body_bytes().unwrap().unwrap(), b"fudge");
        // still available for the next attempt
        assert_eq!(req.take_body_bytes().unwrap().unwrap(), b"fudge");
    }

    #[test]
    fn bare_reader_body_is_not_replayable() {
        let mut req = Request::new(Method::Post, "http://example.com/").unwrap();
        req.set_body_reader(std::io::Cursor::new(b"fudge".to_vec()));
        assert!(!req.is_replayable());
    }

    #[test]
    fn reader_body_with_regenerator_rewinds() {
        let mut req = Request::new(Method::Post, "http://example.com/").unwrap();
        req.set_body_reader_with(std::io::Cursor::new(b"fudge".to_vec()), || {
            Ok(Box::new(std::io::Cursor::new(b"fudge".to_vec())))
        });
        assert!(req.is_replayable());
        assert_eq!(req.take_body_bytes().unwrap().unwrap(), b"fudge");
        // consumed until rewound
        assert!(req.take_body_bytes().unwrap().is_none());
        req.rewind_body().unwrap();
        assert_eq!(req.take_body_bytes().unwrap().unwrap(), b"fudge");
    }

    #[test]
    fn failing_regenerator_surfaces_as_error() {
        let mut req = Request::new(Method::Post, "http://example.com/").unwrap();
        req.set_body_reader_with(std::io::Cursor::new(b"fudge".to_vec()), || {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        });
        req.take_body_bytes().unwrap();
        assert!(matches!(
            req.rewind_body(),
            Err(Error::RegenerateBody { .. })
        ));
    }
}
