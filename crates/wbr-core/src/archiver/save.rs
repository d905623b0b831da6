//! Save requests and job polling.

use super::{form_encode, Archiver, FailureKind, ResolveError, Stage};
use crate::api::{decode, JobState, SaveResponse, StatusResponse};
use crate::retry::Attempt;
use crate::transport::{Request, Transport};

/// An accepted save request. `job_id` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveJob {
    pub original_url: String,
    pub job_id: String,
}

/// How the save endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Legacy behavior: the service redirected straight to the capture.
    Redirect(String),
    /// A capture job was queued.
    Job(SaveJob),
}

impl<T: Transport> Archiver<T> {
    /// Capture `url` now and return its archive URL.
    pub fn archive(&self, url: &str, cookie: Option<&str>) -> Result<String, ResolveError> {
        match self.submit(url, cookie)? {
            Submission::Redirect(location) => {
                tracing::info!(url, archive_url = %location, "save redirected to capture");
                Ok(location)
            }
            Submission::Job(job) => self.wait_for_job(&job),
        }
    }

    /// Submit a save request for `url`.
    ///
    /// Sent once: a lost response must not queue a second capture.
    pub fn submit(&self, url: &str, cookie: Option<&str>) -> Result<Submission, ResolveError> {
        let fail = |kind| ResolveError::new(url, Stage::Submit, kind);
        let cookie = cookie
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| fail(FailureKind::MissingCookie))?;

        let params = form_encode(&[("capture_all", "1"), ("url", url)]);
        let request = Request::post(
            format!("{}/save/?{}", self.settings.api_base, params),
            params.as_bytes(),
        )
        .header("Accept", "application/json")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .header("Cookie", cookie);

        tracing::debug!(url, "submitting save request");
        let response = self
            .transport
            .send(&request)
            .map_err(|e| fail(FailureKind::Transport(e)))?;

        match response.status {
            301 | 302 => match response.header("location").filter(|l| !l.is_empty()) {
                Some(location) => Ok(Submission::Redirect(location.to_string())),
                None => Err(fail(FailureKind::MissingField {
                    field: "Location header",
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                })),
            },
            520 | 523 => Err(fail(FailureKind::Declined {
                status: response.status,
            })),
            _ => {
                let ack: SaveResponse = decode("save", &response.body)
                    .map_err(|e| fail(FailureKind::Malformed(e)))?;
                if ack.job_id.is_empty() {
                    return Err(fail(FailureKind::MissingField {
                        field: "job_id",
                        body: String::from_utf8_lossy(&response.body).into_owned(),
                    }));
                }
                tracing::info!(url, job_id = %ack.job_id, "save job queued");
                Ok(Submission::Job(SaveJob {
                    original_url: url.to_string(),
                    job_id: ack.job_id,
                }))
            }
        }
    }

    /// Poll `job` until it succeeds or fails, then build its archive URL.
    pub fn wait_for_job(&self, job: &SaveJob) -> Result<String, ResolveError> {
        let url = job.original_url.as_str();
        let request = Request::get(self.endpoint(&format!("/save/status/{}", job.job_id), &[]));

        let (status, body) = self.retry(&self.settings.poll_policy, Stage::Poll, url, |attempt| {
            tracing::debug!(url, job_id = %job.job_id, attempt, "polling save job");
            let response = match self.send_retriable(&request) {
                Ok(r) => r,
                Err(outcome) => return outcome,
            };
            let status: StatusResponse = match decode("job status", &response.body) {
                Ok(s) => s,
                Err(e) => return Attempt::Fatal(FailureKind::Malformed(e)),
            };
            match status.state() {
                JobState::Pending => Attempt::retry_after(
                    FailureKind::Pending {
                        job_id: job.job_id.clone(),
                    },
                    self.settings.pending_delay,
                ),
                JobState::Success => Attempt::Done((status, response.body)),
                JobState::Error | JobState::Other(_) => Attempt::Fatal(FailureKind::JobFailed {
                    job_id: job.job_id.clone(),
                    status: status.status,
                    message: status.message,
                }),
            }
        })?;

        if status.timestamp.is_empty() {
            return Err(ResolveError::new(
                url,
                Stage::Poll,
                FailureKind::MissingField {
                    field: "timestamp",
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
            ));
        }
        // Capture URLs are predictable; no need to ask the service again.
        let archive_url = self.archive_url(&status.timestamp, url);
        tracing::info!(url, job_id = %job.job_id, %archive_url, "capture complete");
        Ok(archive_url)
    }

    /// Fetch the current status of a save job once, without retrying.
    ///
    /// No URL is known here, so errors carry `job_id` in [`ResolveError::url`].
    pub fn job_status(&self, job_id: &str) -> Result<StatusResponse, ResolveError> {
        let fail = |kind| ResolveError::new(job_id, Stage::Poll, kind);
        let request = Request::get(self.endpoint(&format!("/save/status/{job_id}"), &[]));
        let response = self
            .transport
            .send(&request)
            .map_err(|e| fail(FailureKind::Transport(e)))?;
        if response.status == 429 {
            return Err(fail(FailureKind::RateLimited));
        }
        decode("job status", &response.body).map_err(|e| fail(FailureKind::Malformed(e)))
    }
}
