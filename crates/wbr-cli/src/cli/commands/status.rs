//! `wbr status` – show one save job.

use anyhow::Result;
use wbr_core::transport::Transport;
use wbr_core::Archiver;

pub fn run_status<T: Transport>(archiver: &Archiver<T>, job_id: &str) -> Result<()> {
    let s = archiver.job_status(job_id)?;
    println!("{:<12} {}", "JOB", job_id);
    println!("{:<12} {}", "STATUS", s.status);
    if !s.original_url.is_empty() {
        println!("{:<12} {}", "URL", s.original_url);
    }
    if !s.timestamp.is_empty() {
        println!(
            "{:<12} {}",
            "ARCHIVE",
            archiver.archive_url(&s.timestamp, &s.original_url)
        );
    }
    if !s.status_ext.is_empty() || !s.message.is_empty() {
        println!("{:<12} {} {}", "DETAIL", s.status_ext, s.message);
    }
    Ok(())
}
