//! Read-only lookups: availability and capture history.

use serde::de::DeserializeOwned;

use super::{Archiver, FailureKind, ResolveError, Stage};
use crate::api::{decode, AvailabilityResponse, Snapshot, SparklineResponse};
use crate::retry::Attempt;
use crate::transport::{Request, Transport};

impl<T: Transport> Archiver<T> {
    /// Ask the availability API for the closest snapshot of `url`.
    ///
    /// The service answers 200 with an empty `archived_snapshots` object when
    /// nothing is archived, so every non-429 response is decoded.
    pub fn check_availability(&self, url: &str) -> Result<AvailabilityResponse, ResolveError> {
        let request = Request::get(self.endpoint("/wayback/available", &[("url", url)]));
        self.lookup(&request, Stage::Availability, "availability", url)
    }

    /// Latest snapshot of `url`, if any. Never submits anything.
    pub fn resolve_one(&self, url: &str) -> Result<Option<Snapshot>, ResolveError> {
        Ok(self.check_availability(url)?.snapshot())
    }

    /// Capture history of `url` per year and month.
    pub fn check_history(&self, url: &str) -> Result<SparklineResponse, ResolveError> {
        let request = Request::get(self.endpoint(
            "/__wb/sparkline/",
            &[("collection", "web"), ("output", "json"), ("url", url)],
        ));
        self.lookup(&request, Stage::History, "sparkline", url)
    }

    fn lookup<R: DeserializeOwned>(
        &self,
        request: &Request,
        stage: Stage,
        what: &'static str,
        url: &str,
    ) -> Result<R, ResolveError> {
        self.retry(&self.settings.lookup_policy, stage, url, |attempt| {
            tracing::debug!(url, attempt, %stage, "lookup");
            let response = match self.send_retriable(request) {
                Ok(r) => r,
                Err(outcome) => return outcome,
            };
            match decode::<R>(what, &response.body) {
                Ok(parsed) => Attempt::Done(parsed),
                Err(e) => Attempt::Fatal(FailureKind::Malformed(e)),
            }
        })
    }
}
