pub mod to_csv_rows;
pub mod to_custom;
pub mod to_json;
pub mod to_text;

/// Common rendering function used by all exporters
/// This helps eliminate duplication across export modules
pub mod renderer {
    use crate::aggregate::{self, corpus_counts};
    use crate::chat::extract_chat;
    use crate::data_loader::Dataset;
    use crate::snapshot::Snapshot;
    use serde_json::{json, Value};
    use std::error::Error;

    /// Standard rendering function for template-based exports
    pub fn render_template(
        dataset: &Dataset,
        snapshot: &Snapshot,
        template: &str,
    ) -> Result<String, Box<dyn Error>> {
        let handlebars = crate::common::get_handlebars();

        let context = create_standard_context(dataset, snapshot);
        let rendered = handlebars.render_template(template, &context)?;
        Ok(rendered)
    }

    /// The context every template sees: one entry per row with its
    /// classification and chat view, plus the corpus-wide structures.
    pub fn create_standard_context(dataset: &Dataset, snapshot: &Snapshot) -> Value {
        let rows: Vec<Value> = dataset
            .rows()
            .iter()
            .map(|row| {
                json!({
                    "index": row.index,
                    "conversationstarttime": row.start_time,
                    "classification": aggregate::classify_row(snapshot, row.index),
                    "messages": extract_chat(snapshot, row.index),
                })
            })
            .collect();

        json!({
            "rows": rows,
            "totals": corpus_counts(snapshot, 0..snapshot.row_count()),
            "feedback": snapshot.feedback(),
            "message_index": snapshot.index(),
        })
    }
}
