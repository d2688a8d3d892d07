//! CLI command handlers, one per file.

mod call;
mod config;
mod resolve;

pub use call::{run_call, CallArgs};
pub use config::run_config;
pub use resolve::run_resolve;
