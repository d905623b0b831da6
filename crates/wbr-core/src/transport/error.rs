//! Network-level transport failure.

use std::fmt;

/// Coarse classification of a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Connection could not be established or was dropped (DNS, reset, etc.).
    Connection,
    /// Any other transport failure.
    Other,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkKind::Timeout => write!(f, "timeout"),
            NetworkKind::Connection => write!(f, "connection"),
            NetworkKind::Other => write!(f, "network"),
        }
    }
}

/// The request never produced an HTTP response.
#[derive(Debug)]
pub struct TransportError {
    kind: NetworkKind,
    message: String,
    source: Option<curl::Error>,
}

impl TransportError {
    pub fn new(kind: NetworkKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> NetworkKind {
        self.kind
    }
}

impl From<curl::Error> for TransportError {
    fn from(e: curl::Error) -> Self {
        Self {
            kind: classify_curl_error(&e),
            message: e.to_string(),
            source: Some(e),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> NetworkKind {
    if e.is_operation_timedout() {
        return NetworkKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return NetworkKind::Connection;
    }
    NetworkKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind() {
        let e = TransportError::new(NetworkKind::Connection, "connection reset by peer");
        assert_eq!(e.to_string(), "connection error: connection reset by peer");
        assert_eq!(e.kind(), NetworkKind::Connection);
        assert!(std::error::Error::source(&e).is_none());
    }
}
