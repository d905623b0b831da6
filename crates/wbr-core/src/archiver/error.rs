//! Per-URL resolution errors.

use std::fmt;

use thiserror::Error;

use crate::api::DecodeError;
use crate::retry::RetryError;
use crate::transport::TransportError;

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Availability,
    Submit,
    Poll,
    History,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Availability => write!(f, "availability check"),
            Stage::Submit => write!(f, "save request"),
            Stage::Poll => write!(f, "save job poll"),
            Stage::History => write!(f, "history lookup"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FailureKind {
    /// Network-level failure; retried where the stage retries.
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("rate limited by the Wayback API (HTTP 429)")]
    RateLimited,
    #[error("save job {job_id} is still pending")]
    Pending { job_id: String },
    #[error(transparent)]
    Malformed(#[from] DecodeError),
    #[error("archive.org declined to archive this page (HTTP {status})")]
    Declined { status: u32 },
    /// A field the protocol requires was absent.
    #[error("response has no {field}: {}", crate::api::snippet(.body))]
    MissingField { field: &'static str, body: String },
    #[error("save job {job_id} ended with status {status:?}{}", message_suffix(.message))]
    JobFailed {
        job_id: String,
        status: String,
        message: String,
    },
    #[error("archiving requires an authentication cookie")]
    MissingCookie,
    #[error("all {attempts} attempts failed: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<FailureKind>,
    },
}

fn message_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

impl FailureKind {
    /// Network failures, rate limiting and pending jobs; worth trying later.
    pub fn is_transient(&self) -> bool {
        match self {
            FailureKind::Transport(_) | FailureKind::RateLimited | FailureKind::Pending { .. } => {
                true
            }
            FailureKind::Exhausted { last, .. } => last.is_transient(),
            _ => false,
        }
    }
}

impl From<RetryError<FailureKind>> for FailureKind {
    fn from(e: RetryError<FailureKind>) -> Self {
        match e {
            RetryError::Exhausted { attempts, last } => FailureKind::Exhausted {
                attempts,
                last: Box::new(last),
            },
            RetryError::Fatal { error, .. } => error,
        }
    }
}

/// Failure to resolve one URL, with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} failed for {url}: {kind}")]
pub struct ResolveError {
    /// The URL being resolved. For [`Archiver::job_status`], the job id.
    ///
    /// [`Archiver::job_status`]: super::Archiver::job_status
    pub url: String,
    pub stage: Stage,
    pub kind: FailureKind,
}

impl ResolveError {
    pub fn new(url: impl Into<String>, stage: Stage, kind: FailureKind) -> Self {
        Self {
            url: url.into(),
            stage,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NetworkKind;

    #[test]
    fn exhausted_retry_keeps_attempt_count() {
        let kind: FailureKind = RetryError::Exhausted {
            attempts: 3,
            last: FailureKind::RateLimited,
        }
        .into();
        assert!(matches!(kind, FailureKind::Exhausted { attempts: 3, .. }));
        assert!(kind.is_transient());
        assert_eq!(
            kind.to_string(),
            "all 3 attempts failed: rate limited by the Wayback API (HTTP 429)"
        );
    }

    #[test]
    fn fatal_retry_unwraps() {
        let kind: FailureKind = RetryError::Fatal {
            attempt: 1,
            error: FailureKind::Declined { status: 523 },
        }
        .into();
        assert!(matches!(kind, FailureKind::Declined { status: 523 }));
        assert!(!kind.is_transient());
    }

    #[test]
    fn display_names_stage_and_url() {
        let e = ResolveError::new(
            "https://a.example",
            Stage::Poll,
            FailureKind::JobFailed {
                job_id: "spn2-1".to_string(),
                status: "error".to_string(),
                message: "Too many captures".to_string(),
            },
        );
        assert_eq!(
            e.to_string(),
            "save job poll failed for https://a.example: save job spn2-1 ended with status \"error\": Too many captures"
        );
    }

    #[test]
    fn transport_is_transient() {
        let kind = FailureKind::from(TransportError::new(NetworkKind::Timeout, "timed out"));
        assert!(kind.is_transient());
        assert!(!FailureKind::MissingCookie.is_transient());
    }
}
