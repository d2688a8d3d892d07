//! Retrying block API requests.
//!
//! Operations change server state, so a failed attempt is only repeated when
//! it can be told apart from one the server acted on: the connection was
//! never made, or the server answered 429/503. See [`RetryPolicy::decide`].

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::RequestError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
