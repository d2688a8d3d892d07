//! Failure of a single request attempt.

/// Why one POST to a block API did not produce a usable reply.
///
/// Server-reported failures (`<div id="apierror">`, `<error info>`) are not
/// request errors; they arrive with a 2xx status and are classified later.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// libcurl gave up before a complete reply was read.
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// A multipart form part was rejected by libcurl; nothing was sent.
    #[error("multipart form: {0}")]
    Form(#[from] curl::FormError),
    /// The request could not be built (bad header, ...); nothing was sent.
    #[error("request setup: {0}")]
    Setup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(RequestError::Http(404).to_string(), "HTTP 404");
        assert_eq!(
            RequestError::Setup("invalid header name ''".into()).to_string(),
            "request setup: invalid header name ''"
        );
    }
}
