//! Course news page.

use super::{html_action, xml_action, ActionResult, PageError};
use crate::control::ActionKey;
use crate::response::ReplyKind;
use crate::session::{ApiCall, ApiSession};
use crate::transport::Transport;

const BLOCK: &str = "news";

pub struct NewsPage<'s, T> {
    session: &'s ApiSession<T>,
    course_id: u64,
}

impl<'s, T: Transport> NewsPage<'s, T> {
    pub fn new(session: &'s ApiSession<T>, course_id: u64) -> Self {
        Self { session, course_id }
    }

    /// Fetches further posts starting at `offset`; returns the list markup.
    pub fn fetch_more(&self, offset: u64) -> Result<ActionResult<String>, PageError> {
        let call = ApiCall::new(BLOCK, "more", ReplyKind::Html)
            .field("cid", self.course_id)
            .field("offset", offset);
        html_action(self.session, call)
    }

    pub fn delete_post(&self, post_id: u64) -> Result<ActionResult<()>, PageError> {
        let call = ApiCall::new(BLOCK, "delete", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "delete", post_id))
            .field("cid", self.course_id)
            .field("postid", post_id);
        xml_action(self.session, call, |_| Ok(()))
    }

    /// Saves an edited post; returns the updated post markup.
    pub fn edit_post(
        &self,
        post_id: u64,
        subject: &str,
        message: &str,
        sticky: bool,
    ) -> Result<ActionResult<String>, PageError> {
        let call = ApiCall::new(BLOCK, "edit", ReplyKind::Html)
            .action(ActionKey::for_item(BLOCK, "edit", post_id))
            .field("cid", self.course_id)
            .field("postid", post_id)
            .field("subject", subject)
            .field("message", message)
            .field("sticky", if sticky { "1" } else { "0" });
        html_action(self.session, call)
    }
}
