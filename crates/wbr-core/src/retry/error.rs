//! Error returned when a retried operation gives up.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every allowed attempt reported a transient failure.
    #[error("all {attempts} attempts failed: {last}")]
    Exhausted { attempts: u32, last: E },
    /// An attempt reported a terminal failure.
    #[error("attempt {attempt} failed: {error}")]
    Fatal { attempt: u32, error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Fatal { attempt, .. } => *attempt,
        }
    }

    /// The last underlying error.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Fatal { error, .. } => error,
        }
    }
}
