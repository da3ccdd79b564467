//! Response model: status, headers, and a streamed body.
//!
//! Header names are lowercased on insert so lookups are case-insensitive.
//! The body is a plain readable stream; closing is dropping. Helpers cover
//! the two consumer responsibilities the retry middleware has: buffering the
//! whole body in memory (keeping partial bytes on a mid-stream failure) and
//! bounded best-effort draining before abandoning a response.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};

/// Readable response body stream.
pub struct ResponseBody {
    reader: Box<dyn Read + Send>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self {
            reader: Box::new(io::empty()),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            reader: Box::new(Cursor::new(bytes.into())),
        }
    }

    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Read the remainder of the body into memory.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read the whole body into memory in place, replacing the stream with an
    /// in-memory replay of whatever was read. On a mid-stream read failure
    /// the error is returned and the partial bytes stay readable.
    pub fn buffer(&mut self) -> io::Result<()> {
        let mut buf = Vec::new();
        let result = self.reader.read_to_end(&mut buf);
        self.reader = Box::new(Cursor::new(buf));
        result.map(|_| ())
    }

    /// Read and discard up to `limit` bytes, then drop the stream. Errors are
    /// ignored: this is connection-pool hygiene, not call correctness.
    pub(crate) fn drain(mut self, limit: u64) {
        let _ = io::copy(&mut (&mut self.reader).take(limit), &mut io::sink());
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseBody")
    }
}

/// The result of one attempt: status code, headers, body.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: ResponseBody,
}

impl Response {
    /// Build a response with the given status and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: ResponseBody::empty(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Insert a header; the name is lowercased.
    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn set_body(&mut self, body: ResponseBody) {
        self.body = body;
    }

    pub fn body_mut(&mut self) -> &mut ResponseBody {
        &mut self.body
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Read the remaining body into a string (lossy UTF-8).
    pub fn text(self) -> io::Result<String> {
        Ok(String::from_utf8_lossy(&self.body.into_bytes()?).into_owned())
    }
}
