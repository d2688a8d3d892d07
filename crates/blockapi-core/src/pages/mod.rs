//! Per-page controllers.
//!
//! Each controller knows the operations one page type uses: operation name,
//! form fields, reply shape, and what to pull out of a successful reply. DOM
//! updates are left to the caller; controllers return typed results.

pub mod materials;
pub mod news;
pub mod qaforum;
pub mod video;

pub use materials::MaterialsPage;
pub use news::NewsPage;
pub use qaforum::{QaForumPage, RatingState};
pub use video::{QuizCue, QuizSchedule, QuizVerdict, VideoPage};

use crate::response::{ApiFailure, ApiResponse, ResponseError, XmlReply};
use crate::session::{ApiCall, ApiSession, CallOutcome, SessionError};
use crate::transport::Transport;

/// Outcome of a page action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult<T> {
    /// A request for the same action is still outstanding; nothing was sent.
    Busy,
    Done(T),
    /// The server refused; show [`ApiFailure::error_box_html`].
    Failed(ApiFailure),
}

impl<T> ActionResult<T> {
    pub fn done(self) -> Option<T> {
        match self {
            ActionResult::Done(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("unexpected reply to {operation}: {source}")]
    Reply {
        operation: String,
        #[source]
        source: ResponseError,
    },
}

/// Successful reply body, once busy and server-reported failures are split off.
enum Payload {
    Fragment(String),
    Document(XmlReply),
}

/// Sends an HTML call and returns the success fragment.
pub(crate) fn html_action<T: Transport>(
    session: &ApiSession<T>,
    call: ApiCall,
) -> Result<ActionResult<String>, PageError> {
    let operation = call.operation.clone();
    finish(session.call(call)?, &operation, |payload| match payload {
        Payload::Fragment(html) => Ok(html),
        Payload::Document(_) => Err(ResponseError::Unexpected(
            "XML document where HTML was expected".into(),
        )),
    })
}

/// Sends an XML call and extracts a value from the success document.
pub(crate) fn xml_action<T: Transport, R>(
    session: &ApiSession<T>,
    call: ApiCall,
    extract: impl FnOnce(&XmlReply) -> Result<R, ResponseError>,
) -> Result<ActionResult<R>, PageError> {
    let operation = call.operation.clone();
    finish(session.call(call)?, &operation, |payload| match payload {
        Payload::Document(doc) => extract(&doc),
        Payload::Fragment(_) => Err(ResponseError::Unexpected(
            "HTML fragment where XML was expected".into(),
        )),
    })
}

fn finish<R>(
    outcome: CallOutcome,
    operation: &str,
    map: impl FnOnce(Payload) -> Result<R, ResponseError>,
) -> Result<ActionResult<R>, PageError> {
    let payload = match outcome {
        CallOutcome::Busy => return Ok(ActionResult::Busy),
        CallOutcome::Done(ApiResponse::Failed(failure)) => return Ok(ActionResult::Failed(failure)),
        CallOutcome::Done(ApiResponse::Fragment(html)) => Payload::Fragment(html),
        CallOutcome::Done(ApiResponse::Document(doc)) => Payload::Document(doc),
    };
    map(payload)
        .map(ActionResult::Done)
        .map_err(|source| PageError::Reply {
            operation: operation.to_string(),
            source,
        })
}

/// Reads the `set` flag of a toggle reply such as `<open set="1"/>`.
pub(crate) fn toggle_flag(doc: &XmlReply, element: &'static str) -> Result<bool, ResponseError> {
    if doc.element(element).is_none() {
        return Err(ResponseError::MissingElement(element));
    }
    Ok(doc.flag(element, "set"))
}
