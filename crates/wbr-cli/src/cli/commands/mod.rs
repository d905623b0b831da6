//! CLI command handlers, one file per command.

mod archive;
mod history;
mod latest;
mod resolve;
mod status;

pub use archive::run_archive;
pub use history::run_history;
pub use latest::run_latest;
pub use resolve::run_resolve;
pub use status::run_status;
