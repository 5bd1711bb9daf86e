use tracing::info;

use crate::activity::Activity;
use crate::data_loader::Dataset;
use crate::feedback::FeedbackMap;
use crate::index::MessageIndex;

/// Read-only derived state for one dataset: parsed activity lists, the global
/// message index, and the resolved feedback map. Built once per dataset load
/// and passed by reference to every query; nothing in here mutates afterward.
#[derive(Debug)]
pub struct Snapshot {
    activities: Vec<Vec<Activity>>,
    index: MessageIndex,
    feedback: FeedbackMap,
}

impl Snapshot {
    pub fn build(dataset: &Dataset) -> Self {
        let activities = dataset.parse_all();
        let index = MessageIndex::build(&activities);
        let feedback = FeedbackMap::resolve(&activities, &index);
        info!(
            "Snapshot built: {} rows, {} ids indexed, {} feedback records on {} messages",
            activities.len(),
            index.len(),
            feedback.record_count(),
            feedback.len(),
        );
        Self {
            activities,
            index,
            feedback,
        }
    }

    pub fn index(&self) -> &MessageIndex {
        &self.index
    }

    pub fn feedback(&self) -> &FeedbackMap {
        &self.feedback
    }

    /// Sorted activity list for a row; empty for out-of-range or unparseable
    /// rows.
    pub fn row_activities(&self, row: usize) -> &[Activity] {
        self.activities
            .get(row)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.activities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_from_dataset() {
        let content = json!({
            "activities": [
                {"id": "m1", "type": "message", "timestamp": 1,
                 "from": {"role": 0}, "text": "hello"},
                {"id": "f1", "type": "invoke", "name": "message/submitAction", "timestamp": 2,
                 "value": {"actionName": "feedback", "replyToId": "m1",
                           "actionValue": {"reaction": "like"}}}
            ]
        })
        .to_string();
        let dataset = Dataset::from_contents(vec![Some(content), None]);

        let snapshot = Snapshot::build(&dataset);
        assert_eq!(snapshot.row_count(), 2);
        assert_eq!(snapshot.row_activities(0).len(), 2);
        assert!(snapshot.row_activities(1).is_empty());
        assert!(snapshot.row_activities(99).is_empty());
        assert!(snapshot.index().contains("m1"));
        assert_eq!(snapshot.feedback().get("m1").len(), 1);
    }
}
