//! Native logging via env_logger (`RUST_LOG`, default `info`).

use anyhow::{Context, Result};
use std::fs::OpenOptions;

/// Log to `log_file` when given (the TUI owns the terminal), else stderr.
pub fn init_logging(log_file: Option<&str>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {path}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    // A logger may already be installed (tests, embedding); keep it.
    let _ = builder.try_init();
    Ok(())
}
