use indexmap::IndexMap;
use serde::Serialize;

use crate::activity::{Activity, ActivityKind};

/// Stored previews are clipped to this many characters.
pub const PREVIEW_LEN: usize = 200;

/// What the index remembers about an identifier. The first occurrence wins
/// for kind/preview/role; every occurrence appends its row index.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub rows: Vec<usize>,
    pub kind: String,
    pub preview: String,
    pub role: Option<i64>,
}

impl MessageRecord {
    fn from_activity(activity: &Activity) -> Self {
        let text = match &activity.kind {
            ActivityKind::Message { text, .. } => text.as_str(),
            ActivityKind::GeneratedAnswer { text } => text.as_str(),
            _ => "",
        };
        Self {
            rows: Vec::new(),
            kind: activity.kind.label().to_string(),
            preview: text.chars().take(PREVIEW_LEN).collect(),
            role: activity.role,
        }
    }
}

/// Maps every activity id seen anywhere in the dataset to the rows carrying
/// it. Used for existence and location lookup only - content truth stays in
/// the rows themselves.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct MessageIndex {
    entries: IndexMap<String, MessageRecord>,
}

impl MessageIndex {
    /// One pass over all rows; `rows[i]` is row i's sorted activity list
    /// (empty for rows that failed to parse).
    pub fn build(rows: &[Vec<Activity>]) -> Self {
        let mut entries: IndexMap<String, MessageRecord> = IndexMap::new();

        for (row_index, activities) in rows.iter().enumerate() {
            for activity in activities {
                let Some(id) = activity.id.as_ref() else {
                    continue;
                };
                let record = entries
                    .entry(id.clone())
                    .or_insert_with(|| MessageRecord::from_activity(activity));
                record.rows.push(row_index);
            }
        }

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&MessageRecord> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MessageRecord)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::parse_row;
    use serde_json::json;

    fn parsed(activities: serde_json::Value) -> Vec<Activity> {
        parse_row(&json!({ "activities": activities }).to_string()).unwrap()
    }

    #[test]
    fn test_registers_every_activity_with_an_id() {
        let rows = vec![parsed(json!([
            {"id": "m1", "type": "message", "text": "hi"},
            {"id": "x1", "type": "typing"},
            {"type": "message", "text": "no id"}
        ]))];
        let index = MessageIndex::build(&rows);
        assert_eq!(index.len(), 2);
        assert!(index.contains("m1"));
        assert!(index.contains("x1"));
    }

    #[test]
    fn test_first_occurrence_wins_rows_accumulate() {
        let rows = vec![
            parsed(json!([
                {"id": "m1", "type": "message", "from": {"role": 0}, "text": "original"}
            ])),
            parsed(json!([
                {"id": "m1", "type": "message", "from": {"role": 1}, "text": "duplicate"}
            ])),
        ];
        let index = MessageIndex::build(&rows);
        let record = index.get("m1").unwrap();
        assert_eq!(record.rows, vec![0, 1]);
        assert_eq!(record.preview, "original");
        assert_eq!(record.role, Some(0));
    }

    #[test]
    fn test_preview_is_clipped() {
        let long_text = "x".repeat(500);
        let rows = vec![parsed(json!([
            {"id": "m1", "type": "message", "text": long_text}
        ]))];
        let index = MessageIndex::build(&rows);
        assert_eq!(index.get("m1").unwrap().preview.chars().count(), PREVIEW_LEN);
    }

    #[test]
    fn test_duplicate_in_same_row_appends_twice() {
        let rows = vec![parsed(json!([
            {"id": "m1", "type": "message", "timestamp": 1, "text": "a"},
            {"id": "m1", "type": "message", "timestamp": 2, "text": "b"}
        ]))];
        let index = MessageIndex::build(&rows);
        assert_eq!(index.get("m1").unwrap().rows, vec![0, 0]);
    }
}
