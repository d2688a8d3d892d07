//! Q&A forum page.

use serde::Serialize;

use super::{xml_action, ActionResult, PageError};
use crate::control::ActionKey;
use crate::response::{ReplyKind, ResponseError, XmlReply};
use crate::session::{ApiCall, ApiSession};
use crate::transport::Transport;

const BLOCK: &str = "qaforums";

/// The viewer's rating on a question or answer after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RatingState {
    pub up: bool,
    pub down: bool,
}

impl RatingState {
    fn from_reply(doc: &XmlReply) -> Result<Self, ResponseError> {
        let rated = doc
            .element("rated")
            .ok_or(ResponseError::MissingElement("rated"))?;
        Ok(Self {
            up: rated.attr("up") == Some("set"),
            down: rated.attr("down") == Some("set"),
        })
    }
}

pub struct QaForumPage<'s, T> {
    session: &'s ApiSession<T>,
}

impl<'s, T: Transport> QaForumPage<'s, T> {
    pub fn new(session: &'s ApiSession<T>) -> Self {
        Self { session }
    }

    /// Toggles an up-rating on the entry `id` (the element id without its
    /// `rup-` / `rdn-` prefix).
    pub fn rate_up(&self, id: &str) -> Result<ActionResult<RatingState>, PageError> {
        let call = ApiCall::new(BLOCK, "rateup", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "rateup", id))
            .field("id", id);
        xml_action(self.session, call, RatingState::from_reply)
    }
}
