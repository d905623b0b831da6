//! `wbr history` – capture counts per year.

use anyhow::Result;
use wbr_core::transport::Transport;
use wbr_core::Archiver;

pub fn run_history<T: Transport>(archiver: &Archiver<T>, url: &str) -> Result<()> {
    let h = archiver.check_history(url)?;
    if h.years.is_empty() {
        println!("No captures of {}", url);
        return Ok(());
    }
    println!("first: {}", h.first_ts.as_deref().unwrap_or("-"));
    println!("last:  {}", h.last_ts.as_deref().unwrap_or("-"));
    println!("{:<6} {}", "YEAR", "CAPTURES");
    for (year, months) in &h.years {
        let total: u64 = months.iter().map(|&n| u64::from(n)).sum();
        println!("{:<6} {}", year, total);
    }
    println!("total: {}", h.total_captures());
    Ok(())
}
