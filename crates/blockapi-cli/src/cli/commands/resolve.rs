//! `blockapi resolve <current-path> <block> <operation>` – print the API path.

use anyhow::Result;
use blockapi_core::api_path::{api_request_path_with, MatchRule};

pub fn run_resolve(
    current_path: &str,
    block: &str,
    operation: &str,
    ignore_case: bool,
) -> Result<()> {
    if block.is_empty() || block.contains('/') {
        anyhow::bail!("block must be a non-empty name without '/'");
    }
    if operation.is_empty() {
        anyhow::bail!("operation must not be empty");
    }
    let rule = MatchRule::from_case_insensitive(ignore_case);
    println!("{}", api_request_path_with(current_path, block, operation, rule));
    Ok(())
}
