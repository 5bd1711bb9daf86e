use indexmap::IndexSet;
use serde::Serialize;

use crate::activity::{Activity, Reaction};
use crate::snapshot::Snapshot;

/// Per-row feedback classification. A row is about the messages it contains:
/// it classifies NEGATIVE/POSITIVE when any of *its* messages received that
/// feedback, wherever in the dataset the feedback event was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFeedback {
    Positive,
    Negative,
    None,
}

impl RowFeedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowFeedback::Positive => "POSITIVE",
            RowFeedback::Negative => "NEGATIVE",
            RowFeedback::None => "",
        }
    }
}

impl Serialize for RowFeedback {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for RowFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackTotals {
    pub positive: usize,
    pub negative: usize,
}

impl FeedbackTotals {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

fn row_message_ids(activities: &[Activity]) -> IndexSet<&str> {
    activities
        .iter()
        .filter(|activity| activity.counts_as_message())
        .filter_map(|activity| activity.id.as_deref())
        .collect()
}

/// Negative takes precedence over positive when a row carries both.
pub fn classify_row(snapshot: &Snapshot, row: usize) -> RowFeedback {
    let mut has_positive = false;
    let mut has_negative = false;

    for id in row_message_ids(snapshot.row_activities(row)) {
        for record in snapshot.feedback().get(id) {
            match record.reaction {
                Reaction::Like => has_positive = true,
                Reaction::Dislike => has_negative = true,
                Reaction::Other(_) => {}
            }
        }
    }

    if has_negative {
        RowFeedback::Negative
    } else if has_positive {
        RowFeedback::Positive
    } else {
        RowFeedback::None
    }
}

pub fn classify_rows(snapshot: &Snapshot) -> Vec<RowFeedback> {
    (0..snapshot.row_count())
        .map(|row| classify_row(snapshot, row))
        .collect()
}

/// Sums like/dislike over every feedback record of every qualifying message
/// id in the given row subset. A message liked twice counts twice.
pub fn corpus_counts<I>(snapshot: &Snapshot, rows: I) -> FeedbackTotals
where
    I: IntoIterator<Item = usize>,
{
    let mut ids: IndexSet<&str> = IndexSet::new();
    for row in rows {
        ids.extend(row_message_ids(snapshot.row_activities(row)));
    }

    let mut totals = FeedbackTotals::default();
    for id in ids {
        for record in snapshot.feedback().get(id) {
            match record.reaction {
                Reaction::Like => totals.positive += 1,
                Reaction::Dislike => totals.negative += 1,
                Reaction::Other(_) => {}
            }
        }
    }
    totals
}
