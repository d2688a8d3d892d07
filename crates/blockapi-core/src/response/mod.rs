//! Classification of block API replies.
//!
//! The server answers in one of two shapes, fixed per operation:
//! - HTML fragments, where a failure is a fragment starting with
//!   `<div id="apierror"`;
//! - small XML documents, where a failure carries an `<error info="..."/>`
//!   element.
//!
//! Server-reported failures are values ([`ApiResponse::Failed`]), not errors.

mod xml;

use quick_xml::escape::escape;
use serde::Serialize;

pub use xml::{XmlElement, XmlReply};

/// Prefix marking an HTML reply as an error block.
const HTML_ERROR_PREFIX: &str = "<div id=\"apierror\"";

/// Shape the server uses to answer a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Html,
    Xml,
}

/// Failure reported by the server inside an otherwise successful HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum ApiFailure {
    /// Complete `<div id="apierror">` block, shown as-is.
    Markup(String),
    /// `info` attribute of an XML `<error>` element.
    Message(String),
}

impl ApiFailure {
    /// Markup for the page's error box.
    pub fn error_box_html(&self) -> String {
        match self {
            ApiFailure::Markup(html) => html.clone(),
            ApiFailure::Message(info) => format!("<p class=\"error\">{}</p>", escape(info.as_str())),
        }
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiFailure::Markup(html) => write!(f, "{}", html.trim()),
            ApiFailure::Message(info) => write!(f, "{}", info),
        }
    }
}

/// Classified reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    /// HTML success markup to insert into the page.
    Fragment(String),
    /// XML success document.
    Document(XmlReply),
    /// Server-reported failure.
    Failed(ApiFailure),
}

impl ApiResponse {
    pub fn is_failure(&self) -> bool {
        matches!(self, ApiResponse::Failed(_))
    }

    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            ApiResponse::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// Errors from reading a reply body.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("malformed XML reply: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("invalid escape in XML reply: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("XML reply is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("XML reply ends inside <{0}>")]
    Truncated(String),
    #[error("XML reply has no root element")]
    NoRootElement,
    #[error("reply has no <{0}> element")]
    MissingElement(&'static str),
    #[error("unexpected reply: {0}")]
    Unexpected(String),
}

/// Classifies a reply body according to the operation's reply kind.
pub fn classify_reply(kind: ReplyKind, body: &str) -> Result<ApiResponse, ResponseError> {
    match kind {
        ReplyKind::Html => Ok(classify_html(body)),
        ReplyKind::Xml => {
            let reply = XmlReply::parse(body)?;
            match reply.element("error") {
                Some(err) => Ok(ApiResponse::Failed(ApiFailure::Message(
                    err.attr("info").unwrap_or_default().to_string(),
                ))),
                None => Ok(ApiResponse::Document(reply)),
            }
        }
    }
}

fn classify_html(body: &str) -> ApiResponse {
    if body.trim_start().starts_with(HTML_ERROR_PREFIX) {
        ApiResponse::Failed(ApiFailure::Markup(body.to_string()))
    } else {
        ApiResponse::Fragment(body.to_string())
    }
}
