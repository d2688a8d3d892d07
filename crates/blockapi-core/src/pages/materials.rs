//! Course materials page: sections and the materials inside them.

use super::{html_action, toggle_flag, xml_action, ActionResult, PageError};
use crate::control::ActionKey;
use crate::response::{ReplyKind, ResponseError};
use crate::session::{ApiCall, ApiSession};
use crate::transport::Transport;

const BLOCK: &str = "materials";

pub struct MaterialsPage<'s, T> {
    session: &'s ApiSession<T>,
    course_id: u64,
}

impl<'s, T: Transport> MaterialsPage<'s, T> {
    pub fn new(session: &'s ApiSession<T>, course_id: u64) -> Self {
        Self { session, course_id }
    }

    fn call(&self, operation: &str, reply: ReplyKind) -> ApiCall {
        ApiCall::new(BLOCK, operation, reply)
    }

    fn course_call(&self, operation: &str, reply: ReplyKind) -> ApiCall {
        self.call(operation, reply).field("cid", self.course_id)
    }

    /// Creates a new section; returns its `<li>` markup.
    pub fn add_section(&self) -> Result<ActionResult<String>, PageError> {
        html_action(self.session, self.call("addsection", ReplyKind::Html))
    }

    pub fn delete_section(&self, section_id: u64) -> Result<ActionResult<()>, PageError> {
        let call = self
            .course_call("delsection", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "delsection", section_id))
            .field("secid", section_id);
        xml_action(self.session, call, |_| Ok(()))
    }

    /// Saves section order; `section_ids` are in display order.
    pub fn save_section_order(&self, section_ids: &[u64]) -> Result<ActionResult<()>, PageError> {
        let mut call = self.course_call("sectionorder", ReplyKind::Xml);
        for (index, id) in section_ids.iter().enumerate() {
            call = call.field(&id.to_string(), index);
        }
        xml_action(self.session, call, |_| Ok(()))
    }

    /// Saves material order; each entry is `(section list id, material id)`
    /// in display order.
    pub fn save_material_order(
        &self,
        order: &[(&str, u64)],
    ) -> Result<ActionResult<()>, PageError> {
        let mut call = self.course_call("materialorder", ReplyKind::Xml);
        for (list, material_id) in order {
            call = call.field(&format!("{list}-{material_id}"), "");
        }
        xml_action(self.session, call, |_| Ok(()))
    }

    /// Renames a section; returns the title as stored by the server.
    pub fn edit_section(
        &self,
        section_id: u64,
        title: &str,
    ) -> Result<ActionResult<String>, PageError> {
        let call = self
            .course_call("editsection", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "editsection", section_id))
            .field("secid", section_id)
            .field("title", title);
        xml_action(self.session, call, |doc| {
            doc.attr("response", "title")
                .map(str::to_string)
                .ok_or(ResponseError::MissingElement("response"))
        })
    }

    /// Toggles whether the section starts opened; returns the new setting.
    pub fn toggle_default_open(&self, section_id: u64) -> Result<ActionResult<bool>, PageError> {
        let call = self
            .course_call("defopen", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "defopen", section_id))
            .field("secid", section_id);
        xml_action(self.session, call, |doc| toggle_flag(doc, "open"))
    }

    /// Toggles section visibility; returns the new setting.
    pub fn toggle_visible(&self, section_id: u64) -> Result<ActionResult<bool>, PageError> {
        let call = self
            .course_call("defvis", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "defvis", section_id))
            .field("secid", section_id);
        xml_action(self.session, call, |doc| toggle_flag(doc, "visible"))
    }

    /// Fetches the "add material" dialog body for a section.
    pub fn add_material_form(&self, section_id: u64) -> Result<ActionResult<String>, PageError> {
        let call = self
            .call("addmatform", ReplyKind::Html)
            .action(ActionKey::for_item(BLOCK, "addmatform", section_id))
            .field("secid", section_id);
        html_action(self.session, call)
    }

    /// Fetches the type-specific part of the add-material form.
    pub fn material_type_form(&self, kind: &str) -> Result<ActionResult<String>, PageError> {
        let call = self
            .call(&format!("addform/{kind}"), ReplyKind::Html)
            .action(ActionKey::new(BLOCK, "addform"));
        html_action(self.session, call)
    }

    /// Adds a material; `extra` carries the type-specific form fields.
    pub fn add_material(
        &self,
        section_id: u64,
        title: &str,
        kind: &str,
        extra: &[(String, String)],
    ) -> Result<ActionResult<String>, PageError> {
        let mut call = self
            .call("addmat", ReplyKind::Html)
            .action(ActionKey::for_item(BLOCK, "addmat", section_id))
            .field("secid", section_id)
            .field("title", title)
            .field("type", kind);
        call.fields.extend(extra.iter().cloned());
        html_action(self.session, call)
    }

    /// Renders a material for the viewer dialog.
    pub fn view_material(
        &self,
        section_id: u64,
        material_id: u64,
        kind: &str,
    ) -> Result<ActionResult<String>, PageError> {
        let call = self
            .course_call(&format!("view/{kind}"), ReplyKind::Html)
            .action(ActionKey::for_item(BLOCK, "view", material_id))
            .field("secid", section_id)
            .field("mid", material_id);
        html_action(self.session, call)
    }

    pub fn delete_material(
        &self,
        section_id: u64,
        material_id: u64,
    ) -> Result<ActionResult<()>, PageError> {
        let call = self
            .course_call("delmat", ReplyKind::Xml)
            .action(ActionKey::for_item(BLOCK, "delmat", material_id))
            .field("secid", section_id)
            .field("mid", material_id);
        xml_action(self.session, call, |_| Ok(()))
    }
}
