//! Resolution orchestrator: turn URLs into archived snapshot URLs.
//!
//! For each URL the archiver asks the availability API for an existing
//! snapshot. When none exists and the caller asked for archival, it submits a
//! save request and polls the resulting job until the capture finishes, then
//! builds the final `{archive_root}/{timestamp}/{url}` address.
//!
//! Lookups retry with a fixed delay, job polling with exponential backoff.
//! Batches run strictly one URL after another; a failing URL is recorded and
//! the batch moves on.

mod batch;
mod error;
mod lookup;
mod save;


use std::time::Duration;

use url::form_urlencoded;

use crate::api::Snapshot;
use crate::config::WbrConfig;
use crate::retry::{run_with_retry_using, Attempt, RetryError, RetryPolicy};
use crate::transport::{CurlTransport, Request, Response, Transport};

pub use batch::{BatchOutcome, ResolvedUrl};
pub use error::{FailureKind, ResolveError, Stage};
pub use save::{SaveJob, Submission};

/// Endpoints, retry policies and fixed delays used by an [`Archiver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiverSettings {
    /// Base URL of the Wayback APIs, without trailing slash.
    pub api_base: String,
    /// Prefix of archived page URLs, without trailing slash.
    pub archive_root: String,
    /// Availability and history lookups.
    pub lookup_policy: RetryPolicy,
    /// Save job polling.
    pub poll_policy: RetryPolicy,
    /// Wait after an HTTP 429.
    pub rate_limit_delay: Duration,
    /// Wait between polls of a pending save job.
    pub pending_delay: Duration,
}

impl Default for ArchiverSettings {
    fn default() -> Self {
        WbrConfig::default().archiver_settings()
    }
}

/// What to do when a URL has no snapshot yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Report the URL as not archived.
    Skip,
    /// Submit a save request authenticated with `cookie`.
    Archive { cookie: Option<String> },
}

impl Fallback {
    pub fn archive(cookie: impl Into<String>) -> Self {
        Fallback::Archive {
            cookie: Some(cookie.into()),
        }
    }
}

/// Outcome of resolving one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A snapshot already existed; nothing was submitted.
    Existing(Snapshot),
    /// A new capture was made.
    Captured { archive_url: String },
    /// No snapshot exists and archival was not requested.
    NotArchived,
}

impl Resolution {
    pub fn archive_url(&self) -> Option<&str> {
        match self {
            Resolution::Existing(s) => Some(&s.url),
            Resolution::Captured { archive_url } => Some(archive_url),
            Resolution::NotArchived => None,
        }
    }
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Drives availability checks, save requests and job polling over a
/// [`Transport`].
pub struct Archiver<T> {
    transport: T,
    settings: ArchiverSettings,
    sleep: Sleeper,
}

impl Archiver<CurlTransport> {
    /// Archiver over libcurl, configured from `cfg`.
    pub fn from_config(cfg: &WbrConfig) -> Self {
        Archiver::new(
            CurlTransport::new(cfg.transport_settings()),
            cfg.archiver_settings(),
        )
    }
}

impl<T: Transport> Archiver<T> {
    pub fn new(transport: T, settings: ArchiverSettings) -> Self {
        Self {
            transport,
            settings,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the blocking sleep used between attempts.
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Bound every retried stage to `max_attempts` tries.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.settings.lookup_policy = self.settings.lookup_policy.with_max_attempts(max_attempts);
        self.settings.poll_policy = self.settings.poll_policy.with_max_attempts(max_attempts);
        self
    }

    pub fn settings(&self) -> &ArchiverSettings {
        &self.settings
    }

    /// Resolve one URL: existing snapshot, or (per `fallback`) a new capture.
    ///
    /// An existing snapshot is always returned as is, whatever the fallback.
    pub fn resolve(&self, url: &str, fallback: &Fallback) -> Result<Resolution, ResolveError> {
        if let Some(snapshot) = self.resolve_one(url)? {
            tracing::info!(url, snapshot = %snapshot.url, "existing snapshot");
            return Ok(Resolution::Existing(snapshot));
        }
        match fallback {
            Fallback::Skip => {
                tracing::info!(url, "no snapshot, archival not requested");
                Ok(Resolution::NotArchived)
            }
            Fallback::Archive { cookie } => {
                let archive_url = self.archive(url, cookie.as_deref())?;
                Ok(Resolution::Captured { archive_url })
            }
        }
    }

    /// `{archive_root}/{timestamp}/{url}`
    pub fn archive_url(&self, timestamp: &str, url: &str) -> String {
        format!("{}/{}/{}", self.settings.archive_root, timestamp, url)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return format!("{}{}", self.settings.api_base, path);
        }
        format!("{}{}?{}", self.settings.api_base, path, form_encode(params))
    }

    /// Send inside a retry loop. Network failures and HTTP 429 come back as
    /// the retry outcome to return from the attempt.
    fn send_retriable<V>(&self, request: &Request) -> Result<Response, Attempt<V, FailureKind>> {
        match self.transport.send(request) {
            Ok(response) if response.status == 429 => Err(Attempt::retry_after(
                FailureKind::RateLimited,
                self.settings.rate_limit_delay,
            )),
            Ok(response) => Ok(response),
            Err(e) => Err(Attempt::retry(FailureKind::Transport(e))),
        }
    }

    fn retry<V, F>(
        &self,
        policy: &RetryPolicy,
        stage: Stage,
        url: &str,
        mut op: F,
    ) -> Result<V, ResolveError>
    where
        F: FnMut(u32) -> Attempt<V, FailureKind>,
    {
        run_with_retry_using(
            policy,
            |delay| (self.sleep)(delay),
            |attempt| {
                let outcome = op(attempt);
                if let Attempt::Retry { error, after } = &outcome {
                    if !policy.can_retry(attempt) {
                        tracing::warn!(url, %stage, attempt, "giving up: {}", error);
                        return outcome;
                    }
                    tracing::warn!(
                        url,
                        %stage,
                        attempt,
                        delay = ?after.unwrap_or_else(|| policy.delay_for(attempt)),
                        "retrying: {}",
                        error
                    );
                }
                outcome
            },
        )
        .map_err(|e: RetryError<FailureKind>| ResolveError::new(url, stage, e.into()))
    }
}

pub(crate) fn form_encode(params: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
