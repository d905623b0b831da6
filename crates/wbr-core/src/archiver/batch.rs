//! Sequential batch resolution with per-URL error isolation.

use super::{Archiver, Fallback, ResolveError, Resolution};
use crate::transport::Transport;

/// A URL that resolved without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub input_url: String,
    pub resolution: Resolution,
}

impl ResolvedUrl {
    pub fn archive_url(&self) -> Option<&str> {
        self.resolution.archive_url()
    }
}

/// Results of a batch, each list in input order.
///
/// Every input URL appears in exactly one of the two lists.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub resolved: Vec<ResolvedUrl>,
    pub errors: Vec<ResolveError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Archive URLs of the resolved entries, skipping the not-archived ones.
    pub fn archive_urls(&self) -> impl Iterator<Item = &str> {
        self.resolved.iter().filter_map(ResolvedUrl::archive_url)
    }
}

impl<T: Transport> Archiver<T> {
    /// Resolve every URL in order, one at a time.
    ///
    /// A failing URL is recorded in [`BatchOutcome::errors`] and does not
    /// stop the rest of the batch.
    pub fn resolve_all<S: AsRef<str>>(&self, urls: &[S], fallback: &Fallback) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (i, url) in urls.iter().enumerate() {
            let url = url.as_ref();
            tracing::debug!(url, index = i, total = urls.len(), "resolving");
            match self.resolve(url, fallback) {
                Ok(resolution) => outcome.resolved.push(ResolvedUrl {
                    input_url: url.to_string(),
                    resolution,
                }),
                Err(e) => {
                    tracing::warn!("{}", e);
                    outcome.errors.push(e);
                }
            }
        }
        tracing::info!(
            resolved = outcome.resolved.len(),
            failed = outcome.errors.len(),
            "batch finished"
        );
        outcome
    }
}
