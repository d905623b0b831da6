pub mod api;
pub mod archiver;
pub mod config;
pub mod logging;
pub mod retry;
pub mod transport;

pub use archiver::{
    Archiver, ArchiverSettings, BatchOutcome, Fallback, FailureKind, ResolveError, Resolution,
    ResolvedUrl, Stage,
};
