//! One page's view of the block APIs.
//!
//! An [`ApiSession`] knows where the page is (`current_path`), which server
//! it talks to, and which actions currently have a request outstanding.
//! Page controllers describe each request as an [`ApiCall`]; the session
//! resolves, sends, retries and classifies it.

use std::path::Path;

use url::Url;

use crate::api_path::MatchRule;
use crate::config::BlockApiConfig;
use crate::control::{ActionKey, RequestControl};
use crate::resolver::{parse_base_url, BlockRequest, Resolver};
use crate::response::{classify_reply, ApiResponse, ReplyKind, ResponseError};
use crate::retry::{run_with_retry, RequestError, RetryPolicy};
use crate::transport::{FilePart, Transport};

/// A single request against a block API.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub action: ActionKey,
    pub block: String,
    pub operation: String,
    pub fields: Vec<(String, String)>,
    /// Files to attach; a non-empty list makes the request multipart.
    pub files: Vec<FilePart>,
    pub reply: ReplyKind,
}

impl ApiCall {
    /// A call whose action key is `<block>.<operation>`.
    pub fn new(block: &str, operation: &str, reply: ReplyKind) -> Self {
        Self {
            action: ActionKey::new(block, operation),
            block: block.to_string(),
            operation: operation.to_string(),
            fields: Vec::new(),
            files: Vec::new(),
            reply,
        }
    }

    pub fn action(mut self, action: ActionKey) -> Self {
        self.action = action;
        self
    }

    pub fn field(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, field: &str, path: &Path) -> Self {
        self.files.push(FilePart {
            field: field.to_string(),
            path: path.to_path_buf(),
        });
        self
    }
}

/// Result of [`ApiSession::call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The same action already had a request outstanding; nothing was sent.
    Busy,
    /// The request completed; the reply may still be a server-reported failure.
    Done(ApiResponse),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not resolve request: {0:#}")]
    Resolve(anyhow::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: RequestError,
    },
    #[error("bad reply from {url}: {source}")]
    Reply {
        url: String,
        #[source]
        source: ResponseError,
    },
}

pub struct ApiSession<T> {
    base_url: Url,
    current_path: String,
    rule: MatchRule,
    retry: RetryPolicy,
    control: RequestControl,
    transport: T,
}

impl<T: Transport> ApiSession<T> {
    pub fn new(base_url: Url, current_path: &str, transport: T) -> Self {
        Self {
            base_url,
            current_path: current_path.to_string(),
            rule: MatchRule::default(),
            retry: RetryPolicy::default(),
            control: RequestControl::new(),
            transport,
        }
    }

    /// Builds a session from config; fails if no usable `base_url` is set.
    pub fn from_config(
        cfg: &BlockApiConfig,
        current_path: &str,
        transport: T,
    ) -> anyhow::Result<Self> {
        let raw = cfg
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no base_url configured"))?;
        Ok(Self::new(parse_base_url(raw)?, current_path, transport)
            .with_rule(cfg.match_rule())
            .with_retry(cfg.retry_policy()))
    }

    pub fn with_rule(mut self, rule: MatchRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shares in-flight state with another session on the same page.
    pub fn with_control(mut self, control: RequestControl) -> Self {
        self.control = control;
        self
    }

    pub fn control(&self) -> &RequestControl {
        &self.control
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL for `operation` on `block`, without sending anything.
    pub fn endpoint(&self, block: &str, operation: &str) -> Result<String, SessionError> {
        Ok(self.request(block, operation, Vec::new())?.url)
    }

    /// Sends `call` unless its action is already in flight.
    pub fn call(&self, call: ApiCall) -> Result<CallOutcome, SessionError> {
        let Some(_guard) = self.control.try_begin(&call.action) else {
            tracing::info!(action = %call.action, "request already in flight, skipped");
            return Ok(CallOutcome::Busy);
        };

        let resolved = self.request(&call.block, &call.operation, call.fields)?;
        let files = call.files;
        let reply = run_with_retry(&self.retry, || {
            if files.is_empty() {
                self.transport.post_form(&resolved.url, &resolved.fields)
            } else {
                self.transport
                    .post_multipart(&resolved.url, &resolved.fields, &files)
            }
        })
        .map_err(|source| SessionError::Request {
            url: resolved.url.clone(),
            source,
        })?;

        let response =
            classify_reply(call.reply, &reply.body).map_err(|source| SessionError::Reply {
                url: resolved.url.clone(),
                source,
            })?;
        if let Some(failure) = response.failure() {
            tracing::warn!(action = %call.action, "server reported failure: {}", failure);
        } else {
            tracing::debug!(action = %call.action, status = reply.status, "request completed");
        }
        Ok(CallOutcome::Done(response))
    }

    fn request(
        &self,
        block: &str,
        operation: &str,
        fields: Vec<(String, String)>,
    ) -> Result<crate::resolver::ResolvedRequest, SessionError> {
        BlockRequest {
            base_url: &self.base_url,
            current_path: &self.current_path,
            block,
            operation,
            fields,
            rule: self.rule,
        }
        .resolve()
        .map_err(SessionError::Resolve)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{session, ScriptedTransport};
    use super::*;
    use crate::response::ApiFailure;
    use std::time::Duration;

    #[test]
    fn call_resolves_and_classifies() {
        let t = ScriptedTransport::default().reply("<li id=\"post-3\">hi</li>");
        let s = session("/course/view/42/", t);
        let out = s
            .call(ApiCall::new("news", "more", ReplyKind::Html).field("offset", 10))
            .unwrap();
        assert_eq!(
            out,
            CallOutcome::Done(ApiResponse::Fragment("<li id=\"post-3\">hi</li>".into()))
        );
        assert_eq!(
            s.transport().last_url(),
            "https://courses.example.edu/course/view/42/news/api/more/"
        );
        assert!(s.control().in_flight().is_empty());
    }

    #[test]
    fn busy_action_sends_nothing() {
        let s = session("/c/materials/", ScriptedTransport::default());
        let call = ApiCall::new("materials", "addsection", ReplyKind::Html);
        let _held = s.control().try_begin(&call.action).unwrap();
        assert_eq!(s.call(call).unwrap(), CallOutcome::Busy);
        assert!(s.transport().sent.borrow().is_empty());
    }

    #[test]
    fn flag_released_after_transport_error() {
        let t = ScriptedTransport::default().fail(RequestError::Http(500));
        let s = session("/c/materials/", t);
        let call = ApiCall::new("materials", "addsection", ReplyKind::Html);
        let key = call.action.clone();
        let err = s.call(call).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Request {
                source: RequestError::Http(500),
                ..
            }
        ));
        assert!(!s.control().is_in_flight(&key));
    }

    #[test]
    fn server_failure_is_a_value() {
        let t = ScriptedTransport::default().reply(r#"<error info="Not allowed"/>"#);
        let s = session("/c/news/", t);
        let out = s
            .call(ApiCall::new("news", "delete", ReplyKind::Xml))
            .unwrap();
        assert_eq!(
            out,
            CallOutcome::Done(ApiResponse::Failed(ApiFailure::Message("Not allowed".into())))
        );
    }

    #[test]
    fn throttled_request_is_retried() {
        let t = ScriptedTransport::default()
            .fail(RequestError::Http(503))
            .reply("<ok/>");
        let s = session("/c/qaforums/", t).with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        });
        let out = s
            .call(ApiCall::new("qaforums", "rateup", ReplyKind::Xml))
            .unwrap();
        assert!(matches!(out, CallOutcome::Done(ApiResponse::Document(_))));
        assert_eq!(s.transport().sent.borrow().len(), 2);
    }

    #[test]
    fn call_with_file_goes_multipart() {
        let s = session("/c/materials/", ScriptedTransport::default().reply("ok"));
        let call = ApiCall::new("materials", "upload/video", ReplyKind::Html)
            .field("secid", 3)
            .file("video_file", Path::new("/tmp/lecture.mp4"));
        s.call(call).unwrap();
        let uploads = s.transport().uploads.borrow();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0][0].field, "video_file");
        assert_eq!(s.transport().last_fields(), super::testing::pairs(&[("secid", "3")]));
    }

    #[test]
    fn malformed_reply_is_error() {
        let t = ScriptedTransport::default().reply("<open></close>");
        let s = session("/c/materials/", t);
        let err = s
            .call(ApiCall::new("materials", "defopen", ReplyKind::Xml))
            .unwrap_err();
        assert!(matches!(err, SessionError::Reply { .. }));
    }

    #[test]
    fn endpoint_uses_match_rule() {
        let s = session("/c/Materials/7/", ScriptedTransport::default())
            .with_rule(MatchRule::IgnoreAsciiCase);
        assert_eq!(
            s.endpoint("materials", "upload/video").unwrap(),
            "https://courses.example.edu/c/Materials/api/upload/video/"
        );
    }

    #[test]
    fn from_config_requires_base_url() {
        let cfg = BlockApiConfig::default();
        assert!(ApiSession::from_config(&cfg, "/", ScriptedTransport::default()).is_err());
        let cfg = BlockApiConfig {
            base_url: Some("http://localhost:8000".into()),
            ..BlockApiConfig::default()
        };
        let s = ApiSession::from_config(&cfg, "/c/", ScriptedTransport::default()).unwrap();
        assert_eq!(
            s.endpoint("news", "more").unwrap(),
            "http://localhost:8000/c/news/api/more/"
        );
    }
}
