//! Video materials: upload progress and in-video quizzes.
//!
//! Video operations live under the materials block with a `/video` suffix
//! (`upload/video`, `request_quiz/video`, ...).

use std::path::Path;

use serde::Serialize;

use super::{html_action, xml_action, ActionResult, PageError};
use crate::control::ActionKey;
use crate::response::{ReplyKind, ResponseError, XmlReply};
use crate::session::{ApiCall, ApiSession, SessionError};
use crate::transport::Transport;

const BLOCK: &str = "materials";

/// Reply from the progress endpoint when the conversion log is unknown.
const PROGRESS_NOT_FOUND: &str = "NOT_FOUND";

/// Multipart field carrying the uploaded video.
const UPLOAD_FIELD: &str = "video_file";

/// A quiz scheduled at a playback second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizCue {
    pub id: String,
    pub time: u64,
    pub asked: bool,
}

/// Quizzes for one video, ordered by time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizSchedule {
    cues: Vec<QuizCue>,
}

impl QuizSchedule {
    /// Reads `<question><id>..</id><time>..</time></question>` records.
    pub fn from_reply(doc: &XmlReply) -> Result<Self, ResponseError> {
        let mut cues = Vec::new();
        for (idx, _) in doc.elements_named("question") {
            let mut id = None;
            let mut time = None;
            for child in doc.children(idx) {
                match child.name.as_str() {
                    "id" => id = Some(child.text.clone()),
                    "time" => time = Some(child.text.clone()),
                    _ => {}
                }
            }
            let id = id.ok_or(ResponseError::MissingElement("id"))?;
            let time = time.ok_or(ResponseError::MissingElement("time"))?;
            let time = time
                .parse::<u64>()
                .map_err(|_| ResponseError::Unexpected(format!("quiz time '{time}' is not a second count")))?;
            cues.push(QuizCue {
                id,
                time,
                asked: false,
            });
        }
        cues.sort_by_key(|c| c.time);
        Ok(Self { cues })
    }

    pub fn cues(&self) -> &[QuizCue] {
        &self.cues
    }

    /// Called on every playback time update. Returns the quiz due at
    /// `second` (marking it asked) if there is one not yet asked.
    pub fn due(&mut self, second: u64) -> Option<&QuizCue> {
        let idx = self.cues.iter().position(|c| c.time >= second)?;
        let cue = &mut self.cues[idx];
        if cue.time != second || cue.asked {
            return None;
        }
        cue.asked = true;
        Some(&self.cues[idx])
    }
}

/// Server verdict on a submitted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QuizVerdict {
    Correct,
    /// Feedback markup to show in place of the quiz.
    Incorrect(String),
}

impl QuizVerdict {
    /// Parses the tab-separated `STATUS\tfeedback` reply.
    fn from_reply(body: &str) -> Self {
        let mut parts = body.split('\t');
        match parts.next().map(str::trim) {
            Some("CORRECT") => QuizVerdict::Correct,
            _ => QuizVerdict::Incorrect(parts.next().unwrap_or_default().to_string()),
        }
    }
}

pub struct VideoPage<'s, T> {
    session: &'s ApiSession<T>,
}

impl<'s, T: Transport> VideoPage<'s, T> {
    pub fn new(session: &'s ApiSession<T>) -> Self {
        Self { session }
    }

    /// URL the upload form posts to.
    pub fn upload_endpoint(&self) -> Result<String, SessionError> {
        self.session.endpoint(BLOCK, "upload/video")
    }

    /// Uploads a video for conversion. Returns the conversion log token
    /// that [`VideoPage::upload_progress`] polls.
    pub fn upload_video(&self, path: &Path) -> Result<ActionResult<String>, PageError> {
        let call = ApiCall::new(BLOCK, "upload/video", ReplyKind::Html)
            .action(ActionKey::new("video", "upload"))
            .file(UPLOAD_FIELD, path);
        let result = html_action(self.session, call)?;
        map_done(result, "upload/video", |body| {
            let token = body.trim();
            if token.is_empty() {
                return Err(ResponseError::Unexpected(
                    "upload reply carries no conversion log".into(),
                ));
            }
            Ok(token.to_string())
        })
    }

    /// Conversion progress in percent, or `None` while the server has none.
    pub fn upload_progress(&self, logfile: &str) -> Result<ActionResult<Option<f64>>, PageError> {
        self.poll_progress("logfile", logfile)
    }

    /// Progress of an upload looked up by file name. Any directory part of
    /// `file_name` (`/` or `\` separated) is dropped before sending.
    pub fn upload_progress_for_file(
        &self,
        file_name: &str,
    ) -> Result<ActionResult<Option<f64>>, PageError> {
        let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        self.poll_progress("filename", base)
    }

    fn poll_progress(&self, field: &str, value: &str) -> Result<ActionResult<Option<f64>>, PageError> {
        let call = ApiCall::new(BLOCK, "progress/video", ReplyKind::Html)
            .action(ActionKey::for_item("video", &format!("progress.{field}"), value))
            .field(field, value);
        let result = html_action(self.session, call)?;
        map_done(result, "progress/video", |body| parse_progress(&body))
    }

    pub fn question_schedule(&self, material_id: u64) -> Result<ActionResult<QuizSchedule>, PageError> {
        let call = ApiCall::new(BLOCK, "get_time_id_list/video", ReplyKind::Xml)
            .action(ActionKey::for_item("video", "schedule", material_id))
            .field("matid", material_id);
        xml_action(self.session, call, QuizSchedule::from_reply)
    }

    /// Fetches a quiz's question markup.
    pub fn request_quiz(&self, quiz_id: &str) -> Result<ActionResult<String>, PageError> {
        let call = ApiCall::new(BLOCK, "request_quiz/video", ReplyKind::Html)
            .action(ActionKey::for_item("video", "request_quiz", quiz_id))
            .field("quiz_id", quiz_id);
        html_action(self.session, call)
    }

    /// Submits the answer form fields for a quiz.
    pub fn submit_quiz(
        &self,
        quiz_id: &str,
        answers: &[(String, String)],
    ) -> Result<ActionResult<QuizVerdict>, PageError> {
        let mut call = ApiCall::new(BLOCK, "submit_quiz/video", ReplyKind::Html)
            .action(ActionKey::for_item("video", "submit_quiz", quiz_id));
        call.fields.extend(answers.iter().cloned());
        let call = call.field("quiz_id", quiz_id);
        let result = html_action(self.session, call)?;
        map_done(result, "submit_quiz/video", |body| {
            Ok(QuizVerdict::from_reply(&body))
        })
    }

    /// Skips a quiz; the reply carries nothing of interest. Tracked apart
    /// from `submit_quiz` so a skip is never refused as busy by a pending submit.
    pub fn skip_quiz(&self, quiz_id: &str) -> Result<ActionResult<()>, PageError> {
        let call = ApiCall::new(BLOCK, "submit_quiz/video", ReplyKind::Html)
            .action(ActionKey::for_item("video", "skip_quiz", quiz_id))
            .field("quiz_id", quiz_id);
        let result = html_action(self.session, call)?;
        map_done(result, "submit_quiz/video", |_| Ok(()))
    }
}

fn map_done<A, B>(
    result: ActionResult<A>,
    operation: &str,
    f: impl FnOnce(A) -> Result<B, ResponseError>,
) -> Result<ActionResult<B>, PageError> {
    match result {
        ActionResult::Busy => Ok(ActionResult::Busy),
        ActionResult::Failed(failure) => Ok(ActionResult::Failed(failure)),
        ActionResult::Done(v) => f(v).map(ActionResult::Done).map_err(|source| PageError::Reply {
            operation: operation.to_string(),
            source,
        }),
    }
}

fn parse_progress(body: &str) -> Result<Option<f64>, ResponseError> {
    let body = body.trim();
    if body.is_empty() || body == PROGRESS_NOT_FOUND {
        return Ok(None);
    }
    let value: f64 = body
        .parse()
        .map_err(|_| ResponseError::Unexpected(format!("progress '{body}' is not a number")))?;
    if value == 0.0 {
        return Ok(None);
    }
    Ok(Some(value.clamp(0.0, 100.0)))
}
