//! `wbr archive` – capture a URL now.

use anyhow::Result;
use wbr_core::transport::Transport;
use wbr_core::Archiver;

pub fn run_archive<T: Transport>(
    archiver: &Archiver<T>,
    url: &str,
    cookie: Option<&str>,
) -> Result<()> {
    let archive_url = archiver.archive(url, cookie)?;
    println!("{}", archive_url);
    Ok(())
}
