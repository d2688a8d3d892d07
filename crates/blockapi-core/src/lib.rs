pub mod config;
pub mod logging;

pub mod api_path;
pub mod control;
pub mod pages;
pub mod resolver;
pub mod response;
pub mod retry;
pub mod session;
pub mod transport;

pub use api_path::{api_request_path, api_request_path_with, MatchRule};
