//! Question records handed to the layout engine and the result envelope they travel in.
//!
//! The types serialise with the field names used by the generation backend (`question`,
//! `options`, `type`, …) so an exported bundle can be loaded again without any mapping.  Optional
//! fields that were absent on input stay absent on output, and keys the engine does not know
//! about (`validation`, `difficulty`, …) are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One generated exam question.
///
/// The layout engine only reads the question text and the options.  A missing text renders as a
/// blank body and missing options render as none; neither is an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl QuestionRecord {
    /// Creates a record with the given question text and no options.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            ..Self::default()
        }
    }

    /// Returns the question text, or an empty string when it is missing.
    pub fn text(&self) -> &str {
        self.question.as_deref().unwrap_or_default()
    }

    /// Returns the answer options in display order.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Returns the question type reported by the generator, if any.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Fields the generator added beyond the known ones.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Adds a generator-specific field and returns the updated record.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Sets the answer options and returns the updated record.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the question type and returns the updated record.
    pub fn with_kind(mut self, kind: impl Into<Option<String>>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the answer and returns the updated record.
    pub fn with_answer(mut self, answer: impl Into<Option<String>>) -> Self {
        self.answer = answer.into();
        self
    }

    /// Sets the explanation and returns the updated record.
    pub fn with_explanation(mut self, explanation: impl Into<Option<String>>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

/// Outcome of generating one question from a reference question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub question_id: String,
    pub success: bool,
    pub question: QuestionRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_question: Option<String>,
    /// Other keys of the result message, such as `validation`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultEntry {
    /// Creates a successful entry for `question`.
    pub fn new(question_id: impl Into<String>, question: QuestionRecord) -> Self {
        Self {
            question_id: question_id.into(),
            success: true,
            question,
            reference_number: None,
            reference_question: None,
            extra: Map::new(),
        }
    }

    /// Sets the success flag and returns the updated entry.
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Sets the reference number and returns the updated entry.
    pub fn with_reference_number(mut self, reference: impl Into<Option<String>>) -> Self {
        self.reference_number = reference.into();
        self
    }
}

/// Totals reported at the end of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_reference: usize,
    pub successful: usize,
    pub failed: usize,
    #[serde(default)]
    pub output_file: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Summary {
    /// Counts successful and failed entries.
    pub fn tally(results: &[ResultEntry], output_file: impl Into<String>) -> Self {
        let successful = results.iter().filter(|entry| entry.success).count();
        Self {
            total_reference: results.len(),
            successful,
            failed: results.len() - successful,
            output_file: output_file.into(),
            extra: Map::new(),
        }
    }
}
