//! `wbr latest` – latest snapshot of one URL.

use anyhow::Result;
use wbr_core::transport::Transport;
use wbr_core::Archiver;

pub fn run_latest<T: Transport>(archiver: &Archiver<T>, url: &str) -> Result<()> {
    match archiver.resolve_one(url)? {
        Some(snapshot) => println!("{}", snapshot.url),
        None => println!("No snapshot of {}", url),
    }
    Ok(())
}
