//! CLI for wbr.

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use wbr_core::config::{self, WbrConfig};
use wbr_core::transport::CurlTransport;
use wbr_core::{Archiver, Fallback};

use commands::{run_archive, run_history, run_latest, run_resolve, run_status};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wbr")]
#[command(about = "wbr: resolve URLs to Wayback Machine snapshots", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/wbr/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve URLs to their latest snapshots, one after another.
    Resolve {
        /// URLs to resolve.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Capture URLs that have no snapshot yet (needs a cookie).
        #[arg(long)]
        archive: bool,
        /// Cookie for the save API (default: $WBR_COOKIE, then config).
        #[arg(long, value_name = "COOKIE")]
        cookie: Option<String>,
        /// Attempts per remote call (default from config).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
    },

    /// Print the latest snapshot of a URL, without archiving.
    Latest {
        url: String,
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
    },

    /// Capture a URL now, even if snapshots exist.
    Archive {
        url: String,
        #[arg(long, value_name = "COOKIE")]
        cookie: Option<String>,
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
    },

    /// Show the status of a save job.
    Status {
        /// Job identifier returned by the save API.
        job_id: String,
    },

    /// Show how often a URL was captured.
    History { url: String },

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<WbrConfig> {
    match path {
        Some(p) => config::load_from(p),
        None => config::load_or_init(),
    }
}

fn archiver(cfg: &WbrConfig, attempts: Option<u32>) -> Archiver<CurlTransport> {
    let archiver = Archiver::from_config(cfg);
    match attempts {
        Some(n) => archiver.with_max_attempts(n),
        None => archiver,
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let load = || -> Result<WbrConfig> {
            let cfg = load_config(cli.config.as_ref())?;
            tracing::debug!("loaded config: {:?}", cfg);
            Ok(cfg)
        };

        match cli.command {
            CliCommand::Resolve {
                urls,
                archive,
                cookie,
                attempts,
            } => {
                let cfg = load()?;
                let fallback = if archive {
                    Fallback::Archive {
                        cookie: cookie.or_else(|| cfg.resolve_cookie()),
                    }
                } else {
                    Fallback::Skip
                };
                run_resolve(&archiver(&cfg, attempts), &urls, &fallback)?;
            }
            CliCommand::Latest { url, attempts } => {
                let cfg = load()?;
                run_latest(&archiver(&cfg, attempts), &url)?;
            }
            CliCommand::Archive {
                url,
                cookie,
                attempts,
            } => {
                let cfg = load()?;
                let cookie = cookie.or_else(|| cfg.resolve_cookie());
                run_archive(&archiver(&cfg, attempts), &url, cookie.as_deref())?;
            }
            CliCommand::Status { job_id } => run_status(&archiver(&load()?, None), &job_id)?,
            CliCommand::History { url } => run_history(&archiver(&load()?, None), &url)?,
            CliCommand::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(shell, &mut cmd, "wbr", &mut std::io::stdout());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
