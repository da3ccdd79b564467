//! Default transport: a [`Doer`] over libcurl's easy interface.
//!
//! One `Easy` handle per send. Response headers and body are collected via
//! curl's callbacks; the request's cancel token is polled from the progress
//! callback so an in-flight transfer can be aborted mid-send.

use std::collections::HashMap;
use std::str;
use std::time::Duration;

use crate::doer::Doer;
use crate::error::Error;
use crate::request::{Method, Request};
use crate::response::{Response, ResponseBody};

/// Transport-level knobs for [`CurlDoer`].
#[derive(Debug, Clone)]
pub struct CurlOptions {
    /// Connection timeout. Zero disables the limit.
    pub connect_timeout: Duration,
    /// Hard wall-clock timeout for the whole transfer. Zero disables it.
    pub timeout: Duration,
    /// Follow 3xx redirects.
    pub follow_redirects: bool,
    /// Optional User-Agent header value.
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::ZERO,
            follow_redirects: true,
            user_agent: Some(format!("curlew/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// The default [`Doer`]: sends one request over libcurl and buffers the
/// response. Holds no per-request state; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct CurlDoer {
    options: CurlOptions,
}

impl CurlDoer {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }
}

impl Doer for CurlDoer {
    fn send(&self, req: &mut Request) -> Result<Response, Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(req.url().as_str())?;
        if self.options.follow_redirects {
            easy.follow_location(true)?;
        }
        if !self.options.connect_timeout.is_zero() {
            easy.connect_timeout(self.options.connect_timeout)?;
        }
        if !self.options.timeout.is_zero() {
            easy.timeout(self.options.timeout)?;
        }
        if let Some(ua) = &self.options.user_agent {
            easy.useragent(ua)?;
        }

        let body = req.take_body_bytes()?;
        match req.method() {
            Method::Get if body.is_none() => easy.get(true)?,
            Method::Head => easy.nobody(true)?,
            Method::Post => easy.post(true)?,
            // custom_request keeps libcurl from flipping the verb to POST
            // when a body is attached
            m => easy.custom_request(m.as_str())?,
        }
        if let Some(bytes) = &body {
            easy.post_fields_copy(bytes)?;
        }

        if !req.headers().is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in req.headers() {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }

        easy.progress(true)?;

        let mut header_lines: Vec<String> = Vec::new();
        let mut body_buf: Vec<u8> = Vec::new();
        let token = req.cancel_token().clone();
        let cancelled = token.clone();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body_buf.extend_from_slice(data);
                Ok(data.len())
            })?;
            // returning false aborts the transfer with CURLE_ABORTED_BY_CALLBACK
            transfer.progress_function(move |_, _, _, _| !token.is_cancelled())?;
            if let Err(e) = transfer.perform() {
                if e.is_aborted_by_callback() && cancelled.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                return Err(Error::Transport(e));
            }
        }

        let status = easy.response_code()? as u16;
        tracing::debug!(method = %req.method(), url = %req.url(), status, "request completed");

        let mut resp = Response::new(status);
        for (name, value) in parse_header_lines(&header_lines) {
            resp.insert_header(&name, value);
        }
        resp.set_body(ResponseBody::from_bytes(body_buf));
        Ok(resp)
    }
}

/// Parse raw header lines into name/value pairs. With redirects followed,
/// curl delivers one block per hop; a new `HTTP/` status line starts a fresh
/// block and only the final block is kept.
fn parse_header_lines(lines: &[String]) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in lines {
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() {
                headers.insert(name.to_string(), value.trim().to_string());
            }
        }
    }
    headers
}
