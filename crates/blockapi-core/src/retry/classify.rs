//! Map request errors onto [`ErrorKind`] for the retry policy.

use super::error::RequestError;
use super::policy::ErrorKind;

/// Kind of a non-2xx status: 429 and 503 ask the client to back off.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Kind of a libcurl failure. A reset or empty reply mid-transfer is `Other`:
/// the server may already have applied the operation.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        ErrorKind::Timeout
    } else if e.is_couldnt_connect() || e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}

pub fn classify(e: &RequestError) -> ErrorKind {
    match e {
        RequestError::Curl(ce) => classify_curl_error(ce),
        RequestError::Http(code) => classify_http_status(*code),
        RequestError::Form(_) | RequestError::Setup(_) => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_statuses() {
        for code in [429, 503] {
            assert_eq!(classify(&RequestError::Http(code)), ErrorKind::Throttled);
        }
    }

    #[test]
    fn server_errors_keep_their_code() {
        assert_eq!(classify_http_status(500), ErrorKind::Http5xx(500));
        assert_eq!(classify_http_status(504), ErrorKind::Http5xx(504));
    }

    #[test]
    fn client_errors_are_other() {
        assert_eq!(classify_http_status(403), ErrorKind::Other);
        assert_eq!(classify_http_status(404), ErrorKind::Other);
    }

    #[test]
    fn curl_failures() {
        // 7 couldn't connect, 28 timed out, 52 got nothing, 56 recv error
        let kind = |code| classify(&RequestError::Curl(curl::Error::new(code)));
        assert_eq!(kind(7), ErrorKind::Connection);
        assert_eq!(kind(28), ErrorKind::Timeout);
        assert_eq!(kind(52), ErrorKind::Other);
        assert_eq!(kind(56), ErrorKind::Other);
    }

    #[test]
    fn setup_errors_are_other() {
        assert_eq!(
            classify(&RequestError::Setup("bad header".into())),
            ErrorKind::Other
        );
    }
}
