//! Vertical footprint of a question block.
//!
//! [`plan_block`] turns a [`QuestionRecord`] into a [`PlannedBlock`]: the sanitised and tokenised
//! content, every wrapped line the renderer will draw, and the [`MeasuredBlock`] heights the flow
//! controller uses for its break decision.  Planning has no side effects and runs once per block,
//! right before that block is placed.

use serde::Serialize;

use crate::geometry::PageGeometry;
use crate::measure::{wrap, TextMetrics, TextStyle, WrappedText};
use crate::model::QuestionRecord;
use crate::richtext::{is_whole_bold, plain_text, tokenize, TextToken};
use crate::sanitize::sanitize;

/// Column separator that, together with a paragraph break, marks a body as tabular.
pub const COLUMN_SEPARATOR: char = '|';

/// Heights making up one block, in millimetres.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MeasuredBlock {
    pub gap_before: f64,
    pub label_height: f64,
    pub label_gap: f64,
    pub body_height: f64,
    pub body_gap: f64,
    pub option_heights: Vec<f64>,
    pub total_height: f64,
}

impl MeasuredBlock {
    /// Height the cursor moves by when the block is drawn, i.e. everything but the leading gap.
    pub fn content_height(&self) -> f64 {
        self.total_height - self.gap_before
    }
}

/// How a question body is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyLayout {
    /// Justified prose in the body font.
    Justified,
    /// Fixed-width rows that are never re-wrapped.
    Tabular,
}

/// The body text of a block, ready to be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedBody {
    pub layout: BodyLayout,
    pub tokens: Vec<TextToken>,
    pub style: TextStyle,
    pub text: WrappedText,
}

/// One answer option with its display label.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedOption {
    pub label: String,
    pub text: WrappedText,
}

/// Everything the renderer needs to draw a block, plus its measured heights.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedBlock {
    pub index: usize,
    pub label: String,
    pub label_style: TextStyle,
    pub body: PlannedBody,
    pub option_style: TextStyle,
    pub options: Vec<PlannedOption>,
    pub measured: MeasuredBlock,
}

/// Returns `Q{n}.` for the zero-based `index`.
pub fn question_label(index: usize) -> String {
    format!("Q{}.", index + 1)
}

/// Returns `(A)`, `(B)`, … for the zero-based `index`, continuing with `(AA)` after `(Z)`.
pub fn option_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    let letters: String = letters.into_iter().rev().collect();
    format!("({letters})")
}

/// Returns `true` for sanitised text that should keep its columns.
pub fn is_tabular(text: &str) -> bool {
    text.contains(COLUMN_SEPARATOR) && text.contains('\n')
}

/// Plans the block for the record at zero-based `index`.
pub fn plan_block<M: TextMetrics + ?Sized>(
    index: usize,
    record: &QuestionRecord,
    metrics: &M,
    geometry: &PageGeometry,
) -> PlannedBlock {
    let width = geometry.content_width();

    let label = question_label(index);
    let label_style = TextStyle::serif(geometry.heading_font_pt).bold();
    let label_text = wrap(metrics, geometry, &label, &label_style, width);

    let body = plan_body(record.text(), metrics, geometry);

    let option_style = TextStyle::serif(geometry.body_font_pt);
    let options: Vec<PlannedOption> = record
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| PlannedOption {
            label: option_label(i),
            text: wrap(
                metrics,
                geometry,
                &sanitize(option),
                &option_style,
                geometry.option_text_width(),
            ),
        })
        .collect();

    let option_heights: Vec<f64> = options.iter().map(|option| option.text.height()).collect();
    let gap_before = geometry.question_gap();
    let label_gap = geometry.label_gap();
    let body_gap = geometry.body_gap();
    let options_total: f64 = option_heights
        .iter()
        .map(|height| height + geometry.option_padding)
        .sum();
    let total_height = gap_before
        + label_text.height()
        + label_gap
        + body.text.height()
        + body_gap
        + options_total;

    PlannedBlock {
        index,
        label,
        label_style,
        measured: MeasuredBlock {
            gap_before,
            label_height: label_text.height(),
            label_gap,
            body_height: body.text.height(),
            body_gap,
            option_heights,
            total_height,
        },
        body,
        option_style,
        options,
    }
}

fn plan_body<M: TextMetrics + ?Sized>(
    raw: &str,
    metrics: &M,
    geometry: &PageGeometry,
) -> PlannedBody {
    let text = sanitize(raw);

    if is_tabular(&text) {
        let style = TextStyle::mono(geometry.mono_font_pt);
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        return PlannedBody {
            layout: BodyLayout::Tabular,
            tokens: vec![TextToken::normal(text.as_str())],
            style,
            text: WrappedText {
                lines,
                line_height: geometry.line_height(style.size_pt),
            },
        };
    }

    let tokens = tokenize(&text);
    // Inline emphasis and justification are not combined: only an all-bold body is set in bold.
    let mut style = TextStyle::serif(geometry.body_font_pt);
    if is_whole_bold(&tokens) {
        style = style.bold();
    }
    let wrapped = wrap(
        metrics,
        geometry,
        &plain_text(&tokens),
        &style,
        geometry.content_width(),
    );

    PlannedBody {
        layout: BodyLayout::Justified,
        tokens,
        style,
        text: wrapped,
    }
}
