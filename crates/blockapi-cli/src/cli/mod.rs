//! CLI for resolving and calling course block APIs.

mod commands;

use anyhow::Result;
use blockapi_core::config;
use clap::{Parser, Subcommand};

use commands::{run_call, run_config, run_resolve, CallArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "blockapi")]
#[command(about = "Resolve and call course block API endpoints", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the API path for an operation as seen from a page location.
    Resolve {
        /// Path of the current page, e.g. /course/view/42/materials/section/7/.
        current_path: String,
        /// Block name, e.g. materials, news, qaforums.
        block: String,
        /// Operation name; may contain slashes (upload/video).
        operation: String,
        /// Match the block name against path segments ignoring ASCII case.
        #[arg(long)]
        ignore_case: bool,
    },

    /// Send a request to a block API operation and print the reply.
    Call {
        /// Block name.
        block: String,
        /// Operation name.
        operation: String,
        /// Path of the page the request is made from.
        #[arg(long, default_value = "/", value_name = "PATH")]
        page: String,
        /// Server origin; overrides base_url from the config file.
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        /// Form field to send, repeatable.
        #[arg(long = "field", short = 'f', value_name = "NAME=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// File to attach as a multipart part, repeatable; e.g. video_file=./lecture.mp4.
        #[arg(long = "file", value_name = "NAME=PATH", value_parser = parse_field)]
        files: Vec<(String, String)>,
        /// The operation answers with XML instead of an HTML fragment.
        #[arg(long)]
        xml: bool,
        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file location and effective settings.
    Config,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Resolve {
                current_path,
                block,
                operation,
                ignore_case,
            } => run_resolve(&current_path, &block, &operation, ignore_case),
            CliCommand::Call {
                block,
                operation,
                page,
                base_url,
                fields,
                files,
                xml,
                json,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = CallArgs {
                    block,
                    operation,
                    page,
                    base_url,
                    fields,
                    files,
                    xml,
                    json,
                };
                run_call(cfg, args).await
            }
            CliCommand::Config => {
                let cfg = config::load_or_init()?;
                run_config(&cfg)
            }
        }
    }
}

#[cfg(test)]
mod tests;
