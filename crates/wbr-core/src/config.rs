use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archiver::ArchiverSettings;
use crate::retry::RetryPolicy;
use crate::transport::TransportSettings;

/// Environment variable consulted for the save API cookie.
pub const COOKIE_ENV: &str = "WBR_COOKIE";

/// Retry parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per stage (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds; fixed delay for lookups, first step of the
    /// exponential backoff while polling save jobs.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Wait after an HTTP 429 before trying again.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_secs: f64,
    /// Wait between polls while a save job is pending.
    #[serde(default = "default_pending_delay")]
    pub pending_delay_secs: f64,
}

fn default_rate_limit_delay() -> f64 {
    1.0
}

fn default_pending_delay() -> f64 {
    3.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 1.0,
            max_delay_secs: 60,
            rate_limit_delay_secs: default_rate_limit_delay(),
            pending_delay_secs: default_pending_delay(),
        }
    }
}

/// Global configuration loaded from `~/.config/wbr/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbrConfig {
    /// Base URL of the Wayback APIs (availability, save, sparkline).
    pub api_base: String,
    /// Prefix of archived page URLs: `{archive_root}/{timestamp}/{url}`.
    pub archive_root: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Cookie for the authenticated save API. `WBR_COOKIE` takes precedence.
    #[serde(default)]
    pub cookie: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for WbrConfig {
    fn default() -> Self {
        Self {
            api_base: "https://web.archive.org".to_string(),
            archive_root: "https://web.archive.org/web".to_string(),
            user_agent: concat!("wbr/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            cookie: None,
            retry: None,
        }
    }
}

impl WbrConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Endpoints and retry policies for the archiver.
    pub fn archiver_settings(&self) -> ArchiverSettings {
        let retry = self.retry_config();
        let base = secs(retry.base_delay_secs);
        let max = Duration::from_secs(retry.max_delay_secs);
        ArchiverSettings {
            api_base: self.api_base.trim_end_matches('/').to_string(),
            archive_root: self.archive_root.trim_end_matches('/').to_string(),
            lookup_policy: RetryPolicy::fixed(retry.max_attempts, base),
            poll_policy: RetryPolicy::exponential(retry.max_attempts, base, max),
            rate_limit_delay: secs(retry.rate_limit_delay_secs),
            pending_delay: secs(retry.pending_delay_secs),
        }
    }

    /// Cookie from the environment, falling back to the config file.
    pub fn resolve_cookie(&self) -> Option<String> {
        std::env::var(COOKIE_ENV)
            .ok()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.cookie.clone().filter(|c| !c.trim().is_empty()))
    }
}

/// Non-finite or negative values become zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wbr")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WbrConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WbrConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<WbrConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: WbrConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = WbrConfig::default();
        assert_eq!(cfg.api_base, "https://web.archive.org");
        assert_eq!(cfg.archive_root, "https://web.archive.org/web");
        assert!(cfg.retry.is_none());
        assert!(cfg.cookie.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = WbrConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: WbrConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            api_base = "http://127.0.0.1:8080/"
            archive_root = "http://127.0.0.1:8080/web/"
            user_agent = "test"
            connect_timeout_secs = 2
            request_timeout_secs = 5

            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: WbrConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 3);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        assert!((retry.rate_limit_delay_secs - 1.0).abs() < 1e-9);
        assert!((retry.pending_delay_secs - 3.0).abs() < 1e-9);

        let s = cfg.archiver_settings();
        assert_eq!(s.api_base, "http://127.0.0.1:8080");
        assert_eq!(s.archive_root, "http://127.0.0.1:8080/web");
        assert_eq!(s.lookup_policy.backoff, Backoff::Fixed);
        assert_eq!(s.lookup_policy.base_delay, Duration::from_millis(500));
        assert_eq!(s.poll_policy.backoff, Backoff::Exponential);
        assert_eq!(s.poll_policy.max_delay, Duration::from_secs(15));
        assert_eq!(s.pending_delay, Duration::from_secs(3));
    }

    #[test]
    fn negative_delay_becomes_zero() {
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(f64::NAN), Duration::ZERO);
        assert_eq!(secs(0.25), Duration::from_millis(250));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
            api_base = "https://web.archive.org"
            archive_root = "https://web.archive.org/web"
            user_agent = "wbr-test"
            connect_timeout_secs = 1
            request_timeout_secs = 2
            cookie = "logged-in-user=me"
            "#
        )
        .unwrap();
        let cfg = load_from(f.path()).unwrap();
        assert_eq!(cfg.user_agent, "wbr-test");
        assert_eq!(cfg.cookie.as_deref(), Some("logged-in-user=me"));
        assert_eq!(cfg.transport_settings().timeout, Duration::from_secs(2));
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("read config"));
    }
}
