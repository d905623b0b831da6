//! Typed payloads returned by the Wayback Machine APIs.
//!
//! Fields the service may omit default to empty values; a payload whose
//! fields have the wrong shape fails to decode.

mod decode;

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

pub use decode::{decode, DecodeError};
pub(crate) use decode::snippet;

/// `GET /wayback/available?url=...`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArchivedSnapshots {
    #[serde(default)]
    pub closest: Option<Closest>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Closest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub timestamp: String,
}

/// An existing archived copy of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub url: String,
    pub timestamp: String,
    /// HTTP status the page had when it was captured.
    pub status: String,
}

impl AvailabilityResponse {
    /// The closest snapshot, if the service reported one with a URL.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.archived_snapshots
            .closest
            .as_ref()
            .filter(|c| !c.url.is_empty())
            .map(|c| Snapshot {
                url: c.url.clone(),
                timestamp: c.timestamp.clone(),
                status: c.status.clone(),
            })
    }
}

/// `POST /save/` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub message: String,
}

/// `GET /save/status/{job_id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub counters: Counters,
    #[serde(default)]
    pub duration_sec: f64,
    #[serde(default)]
    pub first_archive: bool,
    #[serde(default)]
    pub http_status: u32,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub original_url: String,
    #[serde(default)]
    pub outlinks: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub status: String,
    /// Machine-readable failure reason, e.g. `error:too-many-daily-captures`.
    #[serde(default)]
    pub status_ext: String,
    #[serde(default)]
    pub message: String,
    /// Capture timestamp; only set once the job succeeded.
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Counters {
    #[serde(default)]
    pub embeds: u32,
    #[serde(default)]
    pub outlinks: u32,
}

/// State of a save job as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Success,
    Error,
    Other(String),
}

impl JobState {
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => JobState::Pending,
            "success" => JobState::Success,
            "error" => JobState::Error,
            other => JobState::Other(other.to_string()),
        }
    }
}

impl StatusResponse {
    pub fn state(&self) -> JobState {
        JobState::parse(&self.status)
    }
}

/// `GET /__wb/sparkline/?collection=web&output=json&url=...`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SparklineResponse {
    /// Captures per month, keyed by year.
    #[serde(default)]
    pub years: BTreeMap<String, Vec<u32>>,
    #[serde(default)]
    pub first_ts: Option<String>,
    #[serde(default)]
    pub last_ts: Option<String>,
    #[serde(default)]
    pub status: HashMap<String, String>,
}

impl SparklineResponse {
    /// Total number of captures across all years.
    pub fn total_captures(&self) -> u64 {
        self.years
            .values()
            .flat_map(|months| months.iter())
            .map(|&n| u64::from(n))
            .sum()
    }
}
