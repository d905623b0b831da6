//! `wbr resolve` – resolve a batch of URLs.

use anyhow::{bail, Result};
use wbr_core::transport::Transport;
use wbr_core::{Archiver, Fallback};

/// Print `input -> archive_url` per resolved URL and each failure on stderr.
/// Fails if any URL could not be resolved.
pub fn run_resolve<T: Transport>(
    archiver: &Archiver<T>,
    urls: &[String],
    fallback: &Fallback,
) -> Result<()> {
    let outcome = archiver.resolve_all(urls, fallback);
    for r in &outcome.resolved {
        match r.archive_url() {
            Some(archive_url) => println!("{} -> {}", r.input_url, archive_url),
            None => println!("{} -> not archived", r.input_url),
        }
    }
    for e in &outcome.errors {
        eprintln!("error: {}", e);
    }
    if !outcome.is_complete() {
        bail!("{} of {} URLs failed", outcome.errors.len(), urls.len());
    }
    Ok(())
}
