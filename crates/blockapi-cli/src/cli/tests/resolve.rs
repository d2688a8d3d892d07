//! Tests for resolve and config subcommands.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_resolve() {
    match parse(&["blockapi", "resolve", "/course/view/42/", "news", "more"]) {
        CliCommand::Resolve {
            current_path,
            block,
            operation,
            ignore_case,
        } => {
            assert_eq!(current_path, "/course/view/42/");
            assert_eq!(block, "news");
            assert_eq!(operation, "more");
            assert!(!ignore_case);
        }
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_ignore_case() {
    match parse(&[
        "blockapi",
        "resolve",
        "/course/Materials/",
        "materials",
        "addform/essay",
        "--ignore-case",
    ]) {
        CliCommand::Resolve {
            operation,
            ignore_case,
            ..
        } => {
            assert_eq!(operation, "addform/essay");
            assert!(ignore_case);
        }
        _ => panic!("expected Resolve with --ignore-case"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["blockapi", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn resolve_rejects_slash_in_block() {
    use crate::cli::commands::run_resolve;
    assert!(run_resolve("/c/", "news/x", "more", false).is_err());
    assert!(run_resolve("/c/", "news", "", false).is_err());
    assert!(run_resolve("/c/", "news", "more", false).is_ok());
}
