//! libcurl-backed transport.

use std::str;
use std::sync::Mutex;
use std::time::Duration;

use super::error::{NetworkKind, TransportError};
use super::{parse_header_lines, Method, Request, Response, Transport};

/// Timeouts and identity used for every request.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
            user_agent: concat!("wbr/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking transport over one reused curl handle.
///
/// The handle is reset before every request, which clears all options but
/// keeps libcurl's connection cache, so keep-alive connections are reused
/// across calls. Redirects are not followed.
pub struct CurlTransport {
    easy: Mutex<curl::easy::Easy>,
    settings: TransportSettings,
}

impl CurlTransport {
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            easy: Mutex::new(curl::easy::Easy::new()),
            settings,
        }
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new(TransportSettings::default())
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut easy = self
            .easy
            .lock()
            .map_err(|_| TransportError::new(NetworkKind::Other, "curl handle poisoned"))?;
        easy.reset();
        easy.url(&request.url)?;
        match request.method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                easy.post(true)?;
                easy.post_fields_copy(request.body.as_deref().unwrap_or_default())?;
            }
        }
        easy.follow_location(false)?;
        easy.connect_timeout(self.settings.connect_timeout)?;
        easy.timeout(self.settings.timeout)?;
        easy.useragent(&self.settings.user_agent)?;

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !request.headers.is_empty() {
            easy.http_headers(list)?;
        }

        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let mut body = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();
        {
            // Body and headers are owned outside the transfer, so everything
            // read is released with this scope whether or not perform fails.
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(status, bytes = body.len(), url = %request.url, "response received");

        Ok(Response {
            status,
            headers: parse_header_lines(&header_lines),
            body,
        })
    }
}
