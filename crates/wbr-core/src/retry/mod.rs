//! Retry and backoff policy.
//!
//! Every retried stage reports each attempt as an explicit [`Attempt`]:
//! done, worth retrying (optionally with a suggested delay), or fatal. The
//! loop in [`run_with_retry`] matches on that tag uniformly, so callers never
//! need a special error type to stop early.

mod error;
mod policy;
mod run;

pub use error::RetryError;
pub use policy::{Attempt, Backoff, RetryPolicy};
pub use run::{run_with_retry, run_with_retry_using};
