use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Placeholder used when a feedback comment payload is missing or unparseable.
pub const NO_COMMENT: &str = "[no comment]";

#[derive(Debug, Error)]
pub enum RowParseError {
    #[error("row has no content")]
    Empty,
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is null")]
    NullPayload,
}

/// One event inside a conversation transcript, classified into the variants
/// the rest of the pipeline cares about. Anything else becomes `Other` and is
/// only visible to the index (when it carries an id).
#[derive(Debug, Clone)]
pub struct Activity {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub role: Option<i64>,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone)]
pub enum ActivityKind {
    Message { text: String, has_attachments: bool },
    GeneratedAnswer { text: String },
    Feedback(FeedbackSubmission),
    Other,
}

/// An `invoke` activity with `name == "message/submitAction"` and
/// `value.actionName == "feedback"`.
#[derive(Debug, Clone)]
pub struct FeedbackSubmission {
    pub reply_to_id: Option<String>,
    pub reaction: Reaction,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
    Other(String),
}

impl Reaction {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "like" => Reaction::Like,
            "dislike" => Reaction::Dislike,
            other => Reaction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
            Reaction::Other(raw) => raw,
        }
    }
}

impl Serialize for Reaction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Activity {
    /// A role-0 message or generated answer - the only valid target for the
    /// temporal fallback.
    pub fn is_bot_answer(&self) -> bool {
        self.role == Some(0)
            && matches!(
                self.kind,
                ActivityKind::Message { .. } | ActivityKind::GeneratedAnswer { .. }
            )
    }

    /// Message-like activities whose ids participate in per-row
    /// classification and corpus counts.
    pub fn counts_as_message(&self) -> bool {
        matches!(
            self.kind,
            ActivityKind::Message { .. } | ActivityKind::GeneratedAnswer { .. }
        )
    }
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Message { .. } => "message",
            ActivityKind::GeneratedAnswer { .. } => "generated_answer",
            ActivityKind::Feedback(_) => "feedback",
            ActivityKind::Other => "other",
        }
    }
}

/// Parses one row's raw JSON into its activity list, sorted stably by
/// timestamp ascending. Missing timestamps sort as 0, so the original order
/// is preserved among them. Callers treat any error as "zero activities".
pub fn parse_row(raw: &str) -> Result<Vec<Activity>, RowParseError> {
    let payload: Value = serde_json::from_str(raw)?;
    if payload.is_null() {
        return Err(RowParseError::NullPayload);
    }

    let entries = match payload.get("activities").and_then(Value::as_array) {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
    };

    let mut keyed: Vec<(f64, Activity)> = entries
        .iter()
        .map(|entry| (timestamp_key(entry.get("timestamp")), classify(entry)))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(keyed.into_iter().map(|(_, activity)| activity).collect())
}

/// The single place that probes raw JSON fields; everything downstream
/// matches on `ActivityKind` instead.
fn classify(entry: &Value) -> Activity {
    let id = non_empty_str(entry.get("id"));
    let role = entry
        .get("from")
        .and_then(|from| from.get("role"))
        .and_then(Value::as_i64);
    let timestamp = match entry.get("timestamp") {
        Some(Value::String(raw)) => Some(raw.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let kind = match entry.get("type").and_then(Value::as_str) {
        Some("message") => ActivityKind::Message {
            text: entry
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string(),
            has_attachments: entry
                .get("attachments")
                .and_then(Value::as_array)
                .map(|attachments| !attachments.is_empty())
                .unwrap_or(false),
        },
        Some("trace") if is_generated_answer(entry) => ActivityKind::GeneratedAnswer {
            text: entry
                .get("value")
                .and_then(|value| value.get("newValue"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string(),
        },
        Some("invoke") if is_feedback_invoke(entry) => {
            let value = entry.get("value");
            let action_value = value.and_then(|value| value.get("actionValue"));
            ActivityKind::Feedback(FeedbackSubmission {
                reply_to_id: non_empty_str(value.and_then(|value| value.get("replyToId"))),
                reaction: Reaction::from_raw(
                    action_value
                        .and_then(|av| av.get("reaction"))
                        .and_then(Value::as_str)
                        .unwrap_or(""),
                ),
                comment: decode_comment(action_value),
            })
        }
        _ => ActivityKind::Other,
    };

    Activity {
        id,
        timestamp,
        role,
        kind,
    }
}

fn is_generated_answer(entry: &Value) -> bool {
    entry.get("valueType").and_then(Value::as_str) == Some("VariableAssignment")
        && entry
            .get("value")
            .and_then(|value| value.get("name"))
            .and_then(Value::as_str)
            == Some("GeneratedAnswer")
}

fn is_feedback_invoke(entry: &Value) -> bool {
    entry.get("name").and_then(Value::as_str) == Some("message/submitAction")
        && entry
            .get("value")
            .and_then(|value| value.get("actionName"))
            .and_then(Value::as_str)
            == Some("feedback")
}

/// The comment rides along as a JSON string inside `actionValue.feedback`;
/// anything that does not decode cleanly becomes the placeholder.
fn decode_comment(action_value: Option<&Value>) -> String {
    action_value
        .and_then(|av| av.get("feedback"))
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|decoded| {
            decoded
                .get("feedbackText")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| NO_COMMENT.to_string())
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ordering key only: numbers sort by value, ISO strings by epoch millis,
/// anything else as 0.
fn timestamp_key(timestamp: Option<&Value>) -> f64 {
    match timestamp {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(raw)) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.timestamp_millis() as f64,
            Err(_) => raw.parse::<f64>().unwrap_or(0.0),
        },
        _ => 0.0,
    }
}
