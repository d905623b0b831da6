//! Single HTTP request/response cycles against the archive service.
//!
//! The transport reports what happened on the wire (status, headers, body, or
//! a network failure) and nothing more. Whether a 429 means "wait and retry"
//! or a body is worth decoding is decided by the caller.

mod easy;
mod error;

pub use easy::{CurlTransport, TransportSettings};
pub use error::{NetworkKind, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A fully drained response. The connection has already been handed back by
/// the time one of these exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

}

/// Issues one request and returns the complete response.
///
/// Implementations carry no per-request state between calls, so one instance
/// may serve every call of a batch.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

/// Parse raw header lines into name/value pairs.
///
/// Only the headers of the last response block are kept (an interim
/// `100 Continue` block is discarded).
pub(crate) fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let r = Response::new(302, Vec::new())
            .with_header("Location", "https://web.archive.org/web/2024/https://a.example");
        assert_eq!(
            r.header("location"),
            Some("https://web.archive.org/web/2024/https://a.example")
        );
        assert!(r.header("etag").is_none());
    }

    #[test]
    fn parse_header_lines_keeps_last_block() {
        let lines = [
            "HTTP/1.1 100 Continue".to_string(),
            "X-Interim: yes".to_string(),
            String::new(),
            "HTTP/1.1 302 Found".to_string(),
            "Location: https://web.archive.org/web/1/x".to_string(),
            "Content-Type: text/html".to_string(),
        ];
        let h = parse_header_lines(&lines);
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].0, "Location");
        assert_eq!(h[0].1, "https://web.archive.org/web/1/x");
    }

    #[test]
    fn request_builders() {
        let r = Request::post("http://x/save/", "a=b").header("Cookie", "c=d");
        assert_eq!(r.method, Method::Post);
        assert_eq!(r.body.as_deref(), Some(&b"a=b"[..]));
        assert_eq!(r.headers, vec![("Cookie".to_string(), "c=d".to_string())]);
        assert_eq!(Request::get("http://x/").method.as_str(), "GET");
    }
}
