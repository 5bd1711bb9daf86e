//! Associates feedback-submission events with the messages they target.
//!
//! Reply-by-id is authoritative when the target is registered anywhere in the
//! dataset; the temporal heuristic is a best-effort fallback that only looks
//! backward within the same row and drops the event when nothing qualifies.
//! Cross-row resolution assumes message ids are unique across the dataset.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::activity::{Activity, ActivityKind, FeedbackSubmission, Reaction};
use crate::index::MessageIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionMethod {
    /// `replyToId` registered in the same row.
    #[serde(rename = "ID")]
    Id,
    /// `replyToId` registered in a different row only.
    #[serde(rename = "ID_CROSS")]
    IdCross,
    /// Nearest preceding bot answer in the same row.
    #[serde(rename = "TIME")]
    Time,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::Id => "ID",
            ResolutionMethod::IdCross => "ID_CROSS",
            ResolutionMethod::Time => "TIME",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub reaction: Reaction,
    pub comment: String,
    pub method: ResolutionMethod,
}

/// message id -> feedback records, in encounter order: ascending row index,
/// then chronological order within the row.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FeedbackMap {
    entries: IndexMap<String, Vec<FeedbackRecord>>,
}

impl FeedbackMap {
    pub fn resolve(rows: &[Vec<Activity>], index: &MessageIndex) -> Self {
        let mut entries: IndexMap<String, Vec<FeedbackRecord>> = IndexMap::new();

        for (row_index, activities) in rows.iter().enumerate() {
            for (position, activity) in activities.iter().enumerate() {
                let ActivityKind::Feedback(submission) = &activity.kind else {
                    continue;
                };

                let Some((target_id, method)) =
                    resolve_target(submission, activities, position, row_index, index)
                else {
                    debug!("row {}: unresolvable feedback event, dropped", row_index);
                    continue;
                };

                entries.entry(target_id).or_default().push(FeedbackRecord {
                    reaction: submission.reaction.clone(),
                    comment: submission.comment.clone(),
                    method,
                });
            }
        }

        Self { entries }
    }

    /// Records for a message id; empty when the message never got feedback.
    pub fn get(&self, id: &str) -> &[FeedbackRecord] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<FeedbackRecord>)> {
        self.entries.iter()
    }

    /// Number of message ids with at least one record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

fn resolve_target(
    submission: &FeedbackSubmission,
    activities: &[Activity],
    position: usize,
    row_index: usize,
    index: &MessageIndex,
) -> Option<(String, ResolutionMethod)> {
    // Id lookup first, anywhere in the dataset.
    if let Some(target) = &submission.reply_to_id {
        if let Some(record) = index.get(target) {
            let method = if record.rows.contains(&row_index) {
                ResolutionMethod::Id
            } else {
                ResolutionMethod::IdCross
            };
            return Some((target.clone(), method));
        }
    }

    // Temporal fallback: strictly backward within the same row, no wraparound.
    for candidate in activities[..position].iter().rev() {
        if !candidate.is_bot_answer() {
            continue;
        }
        if let Some(id) = &candidate.id {
            return Some((id.clone(), ResolutionMethod::Time));
        }
    }

    None
}
