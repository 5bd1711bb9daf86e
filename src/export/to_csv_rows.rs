use crate::aggregate;
use crate::chat::extract_chat;
use crate::data_loader::Dataset;
use crate::snapshot::Snapshot;
use std::error::Error;

/// One line per transcript row: ordinal index, start time, feedback
/// classification, displayable message count.
pub fn render(dataset: &Dataset, snapshot: &Snapshot) -> Result<String, Box<dyn Error>> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(["row", "conversationstarttime", "feedback", "messages"])?;

        for row in dataset.rows() {
            writer.write_record([
                row.index.to_string(),
                row.start_time.clone().unwrap_or_default(),
                aggregate::classify_row(snapshot, row.index).as_str().to_string(),
                extract_chat(snapshot, row.index).len().to_string(),
            ])?;
        }
        writer.flush()?;
    }

    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification_column() {
        let content = json!({
            "activities": [
                {"id": "m1", "type": "message", "timestamp": 1,
                 "from": {"role": 0}, "text": "hello"},
                {"id": "f1", "type": "invoke", "name": "message/submitAction", "timestamp": 2,
                 "value": {"actionName": "feedback", "replyToId": "m1",
                           "actionValue": {"reaction": "dislike"}}}
            ]
        })
        .to_string();
        let mut dataset = Dataset::default();
        dataset.push_row(Some(content), Some("2024-03-01T10:00:00Z".to_string()));
        dataset.push_row(None, None);
        let snapshot = Snapshot::build(&dataset);

        let rendered = render(&dataset, &snapshot).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "row,conversationstarttime,feedback,messages");
        assert_eq!(lines[1], "0,2024-03-01T10:00:00Z,NEGATIVE,1");
        assert_eq!(lines[2], "1,,,0");
    }
}
