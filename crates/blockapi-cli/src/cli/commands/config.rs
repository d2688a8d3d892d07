//! `blockapi config` – show config path and effective settings.

use anyhow::Result;
use blockapi_core::config::{self, BlockApiConfig};
use blockapi_core::logging;

pub fn run_config(cfg: &BlockApiConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    println!("log file: {}", logging::log_path()?.display());
    println!("{}", serde_json::to_string_pretty(cfg)?);
    let policy = cfg.retry_policy();
    println!(
        "effective retry: {} attempt(s), backoff {}ms..{}ms",
        policy.max_attempts,
        policy.base_delay.as_millis(),
        policy.max_delay.as_millis()
    );
    Ok(())
}
