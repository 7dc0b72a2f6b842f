//! File naming, the JSON results bundle and input loading.
//!
//! The JSON export is independent of the layout engine: it serialises the same records the PDF
//! was rendered from, wrapped in `{ "summary": …, "results": … }`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{QuestionRecord, ResultEntry, Summary};

/// Returns `exam-paper-v2-<YYYY-MM-DD>.pdf`.
pub fn paper_file_name(date: NaiveDate) -> String {
    format!("exam-paper-v2-{}.pdf", date.format("%Y-%m-%d"))
}

/// Returns `paper-mimic-results-<ISO timestamp>.json`, e.g.
/// `paper-mimic-results-2026-10-19T08:30:00.000Z.json`.
pub fn export_file_name(timestamp: DateTime<Utc>) -> String {
    format!(
        "paper-mimic-results-{}.json",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// The `{summary, results}` document written by [`write_bundle`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub summary: Summary,
    pub results: Vec<ResultEntry>,
}

impl ExportBundle {
    pub fn new(summary: Summary, results: Vec<ResultEntry>) -> Self {
        Self { summary, results }
    }

    /// Wraps bare records, numbering them from 1 and tallying them as successful.
    pub fn from_records(records: &[QuestionRecord], output_file: impl Into<String>) -> Self {
        let results: Vec<ResultEntry> = records
            .iter()
            .enumerate()
            .map(|(i, record)| ResultEntry::new((i + 1).to_string(), record.clone()))
            .collect();
        Self {
            summary: Summary::tally(&results, output_file),
            results,
        }
    }

    /// The question records in result order.
    pub fn records(&self) -> Vec<QuestionRecord> {
        self.results
            .iter()
            .map(|entry| entry.question.clone())
            .collect()
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Writes `bundle` into `directory` and returns the written path.
pub fn write_bundle(
    bundle: &ExportBundle,
    directory: impl AsRef<Path>,
    timestamp: DateTime<Utc>,
) -> Result<PathBuf> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;
    let path = directory.join(export_file_name(timestamp));
    fs::write(&path, bundle.to_json()?)?;
    info!(
        "exported {} results to {}",
        bundle.results.len(),
        path.display()
    );
    Ok(path)
}

/// Accepted input documents: an exported bundle or a bare list of records.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PaperInput {
    Bundle(ExportBundle),
    Records(Vec<QuestionRecord>),
}

impl PaperInput {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn records(&self) -> Vec<QuestionRecord> {
        match self {
            PaperInput::Bundle(bundle) => bundle.records(),
            PaperInput::Records(records) => records.clone(),
        }
    }

    /// Converts the input into a bundle, wrapping bare records when needed.
    pub fn into_bundle(self, output_file: impl Into<String>) -> ExportBundle {
        match self {
            PaperInput::Bundle(bundle) => bundle,
            PaperInput::Records(records) => ExportBundle::from_records(&records, output_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_names_follow_the_download_convention() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        assert_eq!(paper_file_name(date), "exam-paper-v2-2026-10-19.pdf");

        let timestamp = Utc
            .with_ymd_and_hms(2026, 10, 19, 8, 30, 5)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            export_file_name(timestamp),
            "paper-mimic-results-2026-10-19T08:30:05.000Z.json"
        );
    }

    #[test]
    fn input_accepts_bare_records_and_bundles() {
        let bare = PaperInput::from_json(r#"[{"question":"A?","options":["x","y"]}]"#)
            .expect("bare records");
        assert!(matches!(bare, PaperInput::Records(ref r) if r.len() == 1));

        let bundle = ExportBundle::from_records(&bare.records(), "out.json");
        let json = bundle.to_json().expect("serialise");
        let parsed = PaperInput::from_json(&json).expect("bundle");
        assert_eq!(parsed, PaperInput::Bundle(bundle));
    }

    #[test]
    fn json_is_indented_with_two_spaces() {
        let bundle = ExportBundle::from_records(&[QuestionRecord::new("A?")], "");
        let json = bundle.to_json().expect("serialise");
        assert!(json.starts_with("{\n  \"summary\": {\n    \"total_reference\": 1"));
    }
}
