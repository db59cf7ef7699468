use anyhow::{anyhow, Result};
use clap::Parser;
use std::env;

use crate::window::{WindowPolicy, DEFAULT_LOAD_STEP, DEFAULT_PAGE_SIZE};

pub const DEFAULT_API_BASE_URL: &str = "https://api-game.bloque.app/game";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowMode {
    Paged,
    Incremental,
}

impl std::str::FromStr for WindowMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "paged" | "pages" | "page" => Ok(WindowMode::Paged),
            "incremental" | "more" | "load-more" => Ok(WindowMode::Incremental),
            _ => Err(anyhow!(
                "Invalid window policy '{s}'. Valid options: paged, incremental"
            )),
        }
    }
}

impl std::fmt::Display for WindowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowMode::Paged => write!(f, "paged"),
            WindowMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Bloque Dashboard - Galactic-Fishing leaderboard and market viewer
///
/// Read-only dashboard with an offline fallback cache.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "bloquedash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Galactic-Fishing leaderboard & market dashboard", long_about = None)]
pub struct CliArgs {
    /// Game API base URL (leaderboard and market live under it)
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Leaderboard windowing: paged or incremental
    #[arg(short, long, env = "WINDOW_POLICY", value_parser = clap::value_parser!(WindowMode))]
    pub window: Option<WindowMode>,

    /// Rows per page for the paged policy (1-100)
    #[arg(long, env = "PAGE_SIZE")]
    pub page_size: Option<usize>,

    /// Rows added per "load more" for the incremental policy (1-500)
    #[arg(long, env = "LOAD_STEP")]
    pub load_step: Option<usize>,

    /// Path to the SQLite fallback cache
    #[arg(long, env = "CACHE_DB_PATH")]
    pub cache_db_path: Option<String>,

    /// Transport timeout for each fetch in milliseconds (100-120000, unset = none)
    #[arg(long, env = "FETCH_TIMEOUT_MS")]
    pub fetch_timeout_ms: Option<u64>,

    /// Log file for the terminal UI (logs would otherwise corrupt the screen)
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<String>,

    /// Load once, print the view model as JSON and exit
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub window_mode: WindowMode,
    pub page_size: usize,
    pub load_step: usize,
    pub cache_db_path: String,
    pub fetch_timeout_ms: Option<u64>,
    pub log_file: String,
    pub json: bool,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Defaults
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

pub fn from_args(args: CliArgs) -> Result<Config> {
    let api_base_url = args
        .api_base_url
        .or_else(|| env::var("API_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    validate_url(&api_base_url, "API_BASE_URL")?;

    let window_mode = args
        .window
        .or_else(|| env_parse("WINDOW_POLICY"))
        .unwrap_or(WindowMode::Paged);

    let page_size = args
        .page_size
        .or_else(|| env_parse("PAGE_SIZE"))
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let page_size = validate_in_range(page_size, 1, 100, "PAGE_SIZE")?;

    let load_step = args
        .load_step
        .or_else(|| env_parse("LOAD_STEP"))
        .unwrap_or(DEFAULT_LOAD_STEP);
    let load_step = validate_in_range(load_step, 1, 500, "LOAD_STEP")?;

    let fetch_timeout_ms = args
        .fetch_timeout_ms
        .or_else(|| env_parse("FETCH_TIMEOUT_MS"));
    if let Some(ms) = fetch_timeout_ms {
        validate_in_range(ms, 100, 120_000, "FETCH_TIMEOUT_MS")?;
    }

    let cache_db_path = args
        .cache_db_path
        .or_else(|| env::var("CACHE_DB_PATH").ok())
        .unwrap_or_else(|| "./bloquedash_cache.db".into());
    if cache_db_path.trim().is_empty() {
        return Err(anyhow!("CACHE_DB_PATH cannot be empty"));
    }

    let log_file = args
        .log_file
        .or_else(|| env::var("LOG_FILE").ok())
        .unwrap_or_else(|| "./bloquedash.log".into());

    Ok(Config {
        api_base_url,
        window_mode,
        page_size,
        load_step,
        cache_db_path,
        fetch_timeout_ms,
        log_file,
        json: args.json,
    })
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    /// The single windowing policy active for this run.
    pub fn window_policy(&self) -> WindowPolicy {
        match self.window_mode {
            WindowMode::Paged => WindowPolicy::paged(self.page_size),
            WindowMode::Incremental => WindowPolicy::incremental(self.load_step),
        }
    }

    pub fn print_summary(&self) {
        eprintln!("Bloque Dashboard Configuration:");
        eprintln!("  API: {}", self.api_base_url);
        match self.window_mode {
            WindowMode::Paged => eprintln!("  Window: paged ({} per page)", self.page_size),
            WindowMode::Incremental => {
                eprintln!("  Window: incremental (+{} per step)", self.load_step)
            }
        }
        eprintln!("  Cache: {}", self.cache_db_path);
        match self.fetch_timeout_ms {
            Some(ms) => eprintln!("  Fetch Timeout: {ms}ms"),
            None => eprintln!("  Fetch Timeout: none"),
        }
    }
}
