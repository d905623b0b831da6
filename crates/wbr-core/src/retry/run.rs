//! Retry loop: run a closure until it is done, fatal, or out of attempts.

use std::time::Duration;

use super::error::RetryError;
use super::policy::{Attempt, RetryPolicy};

/// Runs `op` until it returns [`Attempt::Done`] or the policy says to stop.
///
/// `op` receives the 1-based attempt number. Blocks the calling thread while
/// waiting between attempts.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Attempt<T, E>,
{
    run_with_retry_using(policy, std::thread::sleep, op)
}

/// Like [`run_with_retry`] but waits through `sleep` instead of the thread.
pub fn run_with_retry_using<T, E, F, S>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Attempt<T, E>,
    S: FnMut(Duration),
{
    let mut attempt = 1u32;
    loop {
        match op(attempt) {
            Attempt::Done(value) => return Ok(value),
            Attempt::Fatal(error) => return Err(RetryError::Fatal { attempt, error }),
            Attempt::Retry { error, after } => {
                if !policy.can_retry(attempt) {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
                let delay = after.unwrap_or_else(|| policy.delay_for(attempt));
                sleep(delay);
                attempt += 1;
            }
        }
    }
}
