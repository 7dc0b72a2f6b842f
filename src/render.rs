//! Drawing of planned question blocks.
//!
//! [`render_block`] draws the label, the body and the options of one [`PlannedBlock`] at the
//! position chosen by the flow controller, reusing the lines the planner wrapped.  It then moves
//! the session cursor by exactly the planned content height.

use log::warn;

use crate::canvas::Canvas;
use crate::error::Result;
use crate::flow::{LayoutSession, Placement};
use crate::geometry::PageGeometry;
use crate::layout::{BodyLayout, PlannedBlock};
use crate::measure::TextStyle;
use crate::richtext::FontStyle;

/// Line drawn in place of content that did not fit on the page.
pub const TRUNCATION_MARKER: &str = "[… continued content truncated]";

/// Vertical pen for one block; refuses lines below the clip limit once set.
struct Pen {
    page: usize,
    y: f64,
    limit: Option<f64>,
    clipped: bool,
}

impl Pen {
    /// Reserves a line of `height` and returns its top, or `None` when it would cross the limit.
    fn take(&mut self, height: f64) -> Option<f64> {
        if let Some(limit) = self.limit {
            if self.clipped || self.y + height > limit {
                self.clipped = true;
                return None;
            }
        }
        let top = self.y;
        self.y += height;
        Some(top)
    }

    fn skip(&mut self, gap: f64) {
        if !self.clipped {
            self.y += gap;
        }
    }
}

/// Draws `block` at `placement` and advances the session cursor.
///
/// Returns `true` when the block was cut short at the placement's clip limit.
pub fn render_block<C: Canvas + ?Sized>(
    canvas: &mut C,
    session: &mut LayoutSession,
    block: &PlannedBlock,
    placement: &Placement,
) -> Result<bool> {
    let geometry = *session.geometry();
    let marker_style = TextStyle::serif(geometry.body_font_pt).with_emphasis(FontStyle::Italic);
    let marker_height = geometry.line_height(marker_style.size_pt);

    let mut pen = Pen {
        page: placement.page,
        y: placement.y,
        limit: placement.clip_at.map(|clip| clip - marker_height),
        clipped: false,
    };
    let left = geometry.margin_left;

    // Label.
    if let Some(top) = pen.take(block.measured.label_height) {
        canvas.draw_text(pen.page, left, top, &block.label, &block.label_style)?;
    }
    pen.skip(block.measured.label_gap);

    // Body.
    match block.body.layout {
        BodyLayout::Tabular => draw_tabular(canvas, &mut pen, &geometry, block)?,
        BodyLayout::Justified => draw_justified(canvas, &mut pen, &geometry, block)?,
    }
    pen.skip(block.measured.body_gap);

    // Options with a hanging indent.
    let option_label_style = block.option_style.bold();
    let text_x = left + geometry.option_indent;
    for option in &block.options {
        for (i, line) in option.text.lines.iter().enumerate() {
            let Some(top) = pen.take(option.text.line_height) else {
                break;
            };
            if i == 0 {
                canvas.draw_text(pen.page, left, top, &option.label, &option_label_style)?;
            }
            canvas.draw_text(pen.page, text_x, top, line, &block.option_style)?;
        }
        pen.skip(geometry.option_padding);
    }

    if pen.clipped {
        warn!(
            "question {} truncated on page {}",
            block.index + 1,
            placement.page
        );
        let top = pen.limit.map_or(pen.y, |limit| pen.y.min(limit));
        canvas.draw_text(pen.page, left, top, TRUNCATION_MARKER, &marker_style)?;
    }

    session.advance(block.measured.content_height());
    Ok(pen.clipped)
}

fn draw_tabular<C: Canvas + ?Sized>(
    canvas: &mut C,
    pen: &mut Pen,
    geometry: &PageGeometry,
    block: &PlannedBlock,
) -> Result<()> {
    let body = &block.body;
    for row in &body.text.lines {
        let Some(top) = pen.take(body.text.line_height) else {
            break;
        };
        if canvas.text_width(row, &body.style) > geometry.content_width() {
            warn!(
                "question {}: table row wider than the text column is not wrapped",
                block.index + 1
            );
        }
        canvas.draw_text(pen.page, geometry.margin_left, top, row, &body.style)?;
    }
    Ok(())
}

fn draw_justified<C: Canvas + ?Sized>(
    canvas: &mut C,
    pen: &mut Pen,
    geometry: &PageGeometry,
    block: &PlannedBlock,
) -> Result<()> {
    let body = &block.body;
    let lines = &body.text.lines;
    let width = geometry.content_width();

    for (i, line) in lines.iter().enumerate() {
        let Some(top) = pen.take(body.text.line_height) else {
            break;
        };
        let ends_paragraph = lines.get(i + 1).map_or(true, |next| next.is_empty());
        let words: Vec<&str> = line.split(' ').filter(|word| !word.is_empty()).collect();

        if ends_paragraph || words.len() < 2 {
            canvas.draw_text(pen.page, geometry.margin_left, top, line, &body.style)?;
            continue;
        }

        let widths: Vec<f64> = words
            .iter()
            .map(|word| canvas.text_width(word, &body.style))
            .collect();
        let spare = width - widths.iter().sum::<f64>();
        let gap = spare / (words.len() - 1) as f64;

        let mut x = geometry.margin_left;
        for (word, word_width) in words.iter().zip(&widths) {
            canvas.draw_text(pen.page, x, top, word, &body.style)?;
            x += word_width + gap;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::flow::OversizePolicy;
    use crate::layout::plan_block;
    use crate::measure::TextMetrics;
    use crate::model::QuestionRecord;

    fn render(record: &QuestionRecord) -> (RecordingCanvas, LayoutSession, bool) {
        let mut canvas = RecordingCanvas::default();
        let mut session = LayoutSession::new(PageGeometry::A4, OversizePolicy::Truncate);
        let block = plan_block(0, record, &canvas, session.geometry());
        let placement = session.place(0, &block.measured).expect("place");
        let truncated =
            render_block(&mut canvas, &mut session, &block, &placement).expect("render");
        (canvas, session, truncated)
    }

    #[test]
    fn label_body_and_options_are_stacked() {
        let geometry = PageGeometry::A4;
        let record = QuestionRecord::new("Which is prime?").with_options(["4", "7"]);
        let (canvas, session, truncated) = render(&record);
        assert!(!truncated);

        let label = canvas.find("Q1.").expect("label drawn");
        assert_eq!((label.x, label.y), (20.0, 25.0));
        assert!(label.style.emphasis.is_bold());
        assert_eq!(label.style.size_pt, 12);

        let body = canvas.find("Which is prime?").expect("body drawn");
        let body_y = 25.0 + geometry.line_height(12) + geometry.label_gap();
        assert!((body.y - body_y).abs() < 1e-9);

        let option_a = canvas.find("(A)").expect("option label");
        let text_a = canvas.find("4").expect("option text");
        assert_eq!(option_a.x, 20.0);
        assert_eq!(text_a.x, 32.0);
        assert_eq!(option_a.y, text_a.y);
        assert!(option_a.style.emphasis.is_bold());
        assert!(!text_a.style.emphasis.is_bold());

        let option_b = canvas.find("(B)").expect("second option");
        let step = geometry.line_height(11) + geometry.option_padding;
        assert!((option_b.y - option_a.y - step).abs() < 1e-9);

        let planned = plan_block(0, &record, &canvas, &geometry);
        assert!((session.cursor().y - (25.0 + planned.measured.content_height())).abs() < 1e-9);
    }

    #[test]
    fn mixed_emphasis_renders_plain() {
        let (canvas, _, _) = render(&QuestionRecord::new("**Note** read this"));
        let body = canvas.find("Note read this").expect("plain body");
        assert_eq!(body.style.emphasis, FontStyle::Normal);
    }

    #[test]
    fn whole_bold_body_renders_bold() {
        let (canvas, _, _) = render(&QuestionRecord::new("**All caps warning**"));
        let body = canvas.find("All caps warning").expect("bold body");
        assert_eq!(body.style.emphasis, FontStyle::Bold);
    }

    #[test]
    fn tabular_body_uses_monospace_rows() {
        let (canvas, _, _) = render(&QuestionRecord::new("Name | Score\n\nAnn | 9"));
        let header = canvas.find("Name | Score").expect("header row");
        let row = canvas.find("Ann | 9").expect("data row");
        assert_eq!(header.style, TextStyle::mono(10));
        let mono_line = PageGeometry::A4.line_height(10);
        assert!((row.y - header.y - 2.0 * mono_line).abs() < 1e-9);
    }

    #[test]
    fn justified_lines_fill_the_column() {
        let text = "lorem ipsum dolor sit amet ".repeat(20);
        let (canvas, _, _) = render(&QuestionRecord::new(text.trim_end()));
        let geometry = PageGeometry::A4;

        let first_line_y = canvas.find("lorem").expect("first word").y;
        let words: Vec<_> = canvas
            .ops()
            .iter()
            .filter(|op| op.y == first_line_y && op.text != "Q1.")
            .collect();
        assert!(words.len() > 2, "first line is drawn word by word");
        let last = words.last().expect("last word");
        let right_edge = last.x + canvas.text_width(&last.text, &last.style);
        assert!((right_edge - (geometry.margin_left + geometry.content_width())).abs() < 1e-6);
    }

    #[test]
    fn oversized_block_is_truncated_with_marker() {
        let options: Vec<String> = (0..120).map(|i| format!("option {i}")).collect();
        let record = QuestionRecord::new("Too long").with_options(options);
        let (canvas, session, truncated) = render(&record);
        assert!(truncated);

        let marker = canvas.find(TRUNCATION_MARKER).expect("marker drawn");
        let geometry = PageGeometry::A4;
        assert!(marker.y + geometry.line_height(11) <= geometry.body_end_y() + 1e-9);
        assert!(canvas
            .ops()
            .iter()
            .all(|op| op.y + geometry.line_height(op.style.size_pt) <= geometry.body_end_y() + 1e-9));
        assert_eq!(session.cursor().y, geometry.body_end_y());
    }
}
