//! Startup configuration.
//!
//! Values come from command-line flags with environment-variable fallbacks,
//! then get validated into an [`AppConfig`].

use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Url;
use std::time::Duration;

use crate::controller::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Largest page the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Parser, Debug, Clone)]
#[command(name = "traj-dash", about = "Trajectory analytics dashboard")]
pub struct Cli {
    /// REST API base URL.
    #[arg(long, env = "TRAJ_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Server root for /stats and /health. Defaults to the API base without
    /// a trailing `/api`.
    #[arg(long, env = "TRAJ_ROOT_BASE")]
    pub root_base: Option<String>,

    /// Trajectories per page.
    #[arg(long, env = "TRAJ_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Quiet period before a search term is sent, in milliseconds.
    #[arg(long, env = "TRAJ_SEARCH_DEBOUNCE_MS", default_value_t = DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64)]
    pub search_debounce_ms: u64,

    /// Import status poll interval, in milliseconds.
    #[arg(long, env = "TRAJ_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// HTTP request timeout, in seconds.
    #[arg(long, env = "TRAJ_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log to stderr only.
    #[arg(long)]
    pub no_log_file: bool,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub root_base: String,
    pub page_size: u32,
    pub search_debounce: Duration,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            root_base: derive_root_base(DEFAULT_API_BASE),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: crate::http::DEFAULT_TIMEOUT,
            log_to_file: true,
        }
    }
}

impl AppConfig {
    /// Parses the process arguments and environment.
    pub fn from_env() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        let api_base = normalize_base(&cli.api_base).context("invalid --api-base")?;
        let root_base = match cli.root_base.as_deref() {
            Some(root) => normalize_base(root).context("invalid --root-base")?,
            None => derive_root_base(&api_base),
        };
        if cli.page_size == 0 || cli.page_size > MAX_PAGE_SIZE {
            bail!("--page-size must be between 1 and {MAX_PAGE_SIZE}, got {}", cli.page_size);
        }
        if cli.poll_interval_ms == 0 {
            bail!("--poll-interval-ms must be positive");
        }
        if cli.timeout_secs == 0 {
            bail!("--timeout-secs must be positive");
        }
        Ok(Self {
            api_base,
            root_base,
            page_size: cli.page_size,
            search_debounce: Duration::from_millis(cli.search_debounce_ms),
            poll_interval: Duration::from_millis(cli.poll_interval_ms),
            timeout: Duration::from_secs(cli.timeout_secs),
            log_to_file: !cli.no_log_file,
        })
    }
}

fn normalize_base(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).with_context(|| format!("`{raw}` is not a URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("`{raw}` must use http or https");
    }
    Ok(trimmed.to_string())
}

/// Strips a trailing `/api` path segment.
fn derive_root_base(api_base: &str) -> String {
    let trimmed = api_base.trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}
