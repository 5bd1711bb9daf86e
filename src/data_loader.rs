use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::activity::{self, Activity, RowParseError};

/// Column offsets for a transcript CSV, resolved from the header row.
pub struct DfTranscriptLoadProfile {
    pub content_column: usize,
    pub start_time_column: Option<usize>,
}

impl Default for DfTranscriptLoadProfile {
    fn default() -> Self {
        Self {
            content_column: 0,
            start_time_column: None,
        }
    }
}

impl Display for DfTranscriptLoadProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transcript column offsets: content:{}, conversationstarttime:{:?}",
            self.content_column, self.start_time_column,
        )
    }
}

pub fn create_df_transcript_load_profile(headers: &[String]) -> DfTranscriptLoadProfile {
    let mut profile = DfTranscriptLoadProfile::default();
    for (i, field) in headers.iter().enumerate() {
        match field.as_str() {
            "content" => profile.content_column = i,
            "conversationstarttime" => profile.start_time_column = Some(i),
            _ => {}
        }
    }
    profile
}

pub fn verify_transcript_headers(headers: &[String]) -> Result<()> {
    let columns: HashSet<&String> = headers.iter().collect();
    if !columns.contains(&"content".to_string()) {
        return Err(anyhow::anyhow!("Missing required column 'content'"));
    }
    Ok(())
}

pub fn get_headers_from_file(filename: &str, separator: u8) -> Result<Vec<String>> {
    let file = File::open(filename)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    if let Some(Ok(header)) = lines.next() {
        let headers: Vec<String> = header
            .split(separator as char)
            .map(|col_name| col_name.trim().to_string())
            .collect();

        Ok(headers)
    } else {
        Err(anyhow::anyhow!("Failed to read header from file"))
    }
}

pub fn load_records(filename: &str, separator: u8) -> Result<Vec<StringRecord>> {
    let path = Path::new(filename);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .from_path(path)?;

    let records: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;

    Ok(records)
}

/// One conversation transcript, identified by its 0-based position in the
/// source dataset.
#[derive(Debug, Clone)]
pub struct TranscriptRow {
    pub index: usize,
    pub content: Option<String>,
    pub start_time: Option<String>,
}

impl TranscriptRow {
    pub fn parse_activities(&self) -> Result<Vec<Activity>, RowParseError> {
        match self.content.as_deref() {
            Some(raw) => activity::parse_row(raw),
            None => Err(RowParseError::Empty),
        }
    }

    /// Calendar date of `conversationstarttime`, used for row-subset
    /// filtering. Accepts RFC 3339 and a couple of ISO-ish shapes.
    pub fn conversation_date(&self) -> Option<NaiveDate> {
        let raw = self.start_time.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt.date());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

/// The immutable dataset handle every derived structure is built from.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    rows: Vec<TranscriptRow>,
}

impl Dataset {
    /// Construction convenience for JSON payloads without CSV metadata.
    pub fn from_contents<I>(contents: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut dataset = Dataset::default();
        for content in contents {
            dataset.push_row(content, None);
        }
        dataset
    }

    pub fn push_row(&mut self, content: Option<String>, start_time: Option<String>) {
        let index = self.rows.len();
        self.rows.push(TranscriptRow {
            index,
            content,
            start_time,
        });
    }

    pub fn rows(&self) -> &[TranscriptRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parses every row once; rows that fail to parse contribute an empty
    /// activity list and never affect their neighbours.
    pub fn parse_all(&self) -> Vec<Vec<Activity>> {
        self.rows
            .iter()
            .map(|row| {
                row.parse_activities().unwrap_or_else(|err| {
                    debug!("row {}: skipped ({})", row.index, err);
                    Vec::new()
                })
            })
            .collect()
    }
}

/// Appends every row of a transcript CSV to the dataset, in file order.
pub fn append_transcripts(dataset: &mut Dataset, filename: &str, separator: u8) -> Result<()> {
    let headers = get_headers_from_file(filename, separator)?;
    verify_transcript_headers(&headers)?;
    let profile = create_df_transcript_load_profile(&headers);
    debug!("{}", profile);

    let records = load_records(filename, separator)?;
    for record in &records {
        let content = record
            .get(profile.content_column)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);
        let start_time = profile
            .start_time_column
            .and_then(|column| record.get(column))
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);
        dataset.push_row(content, start_time);
    }
    Ok(())
}

pub fn load_transcripts(filename: &str, separator: u8) -> Result<Dataset> {
    let mut dataset = Dataset::default();
    append_transcripts(&mut dataset, filename, separator)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_profile_resolves_columns_by_header() {
        let headers = vec![
            "conversationid".to_string(),
            "conversationstarttime".to_string(),
            "content".to_string(),
        ];
        let profile = create_df_transcript_load_profile(&headers);
        assert_eq!(profile.content_column, 2);
        assert_eq!(profile.start_time_column, Some(1));
    }

    #[test]
    fn test_missing_content_column_is_rejected() {
        let headers = vec!["a".to_string(), "b".to_string()];
        assert!(verify_transcript_headers(&headers).is_err());
    }

    #[test]
    fn test_load_transcripts_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "conversationstarttime,content").unwrap();
        writeln!(file, "2024-03-01T10:00:00Z,\"{{\"\"activities\"\": []}}\"").unwrap();
        writeln!(file, ",").unwrap();

        let dataset = load_transcripts(file.path().to_str().unwrap(), b',').unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.get(0).unwrap().content.is_some());
        assert!(dataset.get(1).unwrap().content.is_none());
        assert_eq!(
            dataset.get(0).unwrap().conversation_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[test]
    fn test_parse_all_isolates_bad_rows() {
        let dataset = Dataset::from_contents(vec![
            Some("not json".to_string()),
            Some("{\"activities\": [{\"id\": \"m1\", \"type\": \"message\", \"text\": \"hi\"}]}".to_string()),
            None,
        ]);
        let rows = dataset.parse_all();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1].len(), 1);
        assert!(rows[2].is_empty());
    }

    #[test]
    fn test_conversation_date_shapes() {
        let mut dataset = Dataset::default();
        dataset.push_row(None, Some("2024-03-01 10:22:33".to_string()));
        dataset.push_row(None, Some("2024-03-02".to_string()));
        dataset.push_row(None, Some("garbage".to_string()));
        assert_eq!(
            dataset.get(0).unwrap().conversation_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            dataset.get(1).unwrap().conversation_date(),
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
        assert_eq!(dataset.get(2).unwrap().conversation_date(), None);
    }
}
