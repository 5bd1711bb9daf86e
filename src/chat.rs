use serde::Serialize;

use crate::activity::ActivityKind;
use crate::feedback::FeedbackRecord;
use crate::snapshot::Snapshot;

pub const VISUAL_CONTENT: &str = "[visual content]";
pub const EMPTY_MESSAGE: &str = "[message without text]";
pub const EMPTY_ANSWER: &str = "[empty generated answer]";

/// One displayable message of a row's chat view, with the feedback records
/// resolved for it anywhere in the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub id: String,
    pub timestamp: Option<String>,
    pub from_user: bool,
    pub text: String,
    pub feedbacks: &'a [FeedbackRecord],
}

/// Reconstructs the chat content of one row in display order. Messages
/// without text are kept only when they carry attachments or received
/// feedback, so resolved feedback is never silently invisible.
pub fn extract_chat(snapshot: &Snapshot, row: usize) -> Vec<ChatMessage<'_>> {
    let mut messages = Vec::new();

    for activity in snapshot.row_activities(row) {
        let Some(id) = activity.id.as_deref() else {
            continue;
        };
        let feedbacks = snapshot.feedback().get(id);

        let entry = match &activity.kind {
            ActivityKind::Message {
                text,
                has_attachments,
            } => {
                let from_user = activity.role == Some(1);
                if !text.is_empty() {
                    Some((text.clone(), from_user))
                } else if *has_attachments {
                    Some((VISUAL_CONTENT.to_string(), from_user))
                } else if !feedbacks.is_empty() {
                    Some((EMPTY_MESSAGE.to_string(), from_user))
                } else {
                    None
                }
            }
            ActivityKind::GeneratedAnswer { text } => {
                if !text.is_empty() {
                    Some((text.clone(), false))
                } else if !feedbacks.is_empty() {
                    Some((EMPTY_ANSWER.to_string(), false))
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some((text, from_user)) = entry {
            messages.push(ChatMessage {
                id: id.to_string(),
                timestamp: activity.timestamp.clone(),
                from_user,
                text,
                feedbacks,
            });
        }
    }

    messages
}
