//! Text measurement and line wrapping.
//!
//! Both the planner and the renderer wrap text through [`wrap_text`] with the same
//! [`TextStyle`], so the number of lines decided while planning is exactly the number of lines
//! drawn.  Style differences inside a run (bold words in a normal paragraph) are ignored for
//! wrapping purposes: the run is measured as one plain string in its base style.

use crate::geometry::{pt_to_mm, PageGeometry};
use crate::richtext::{plain_text, FontStyle, TextToken};

/// Typeface family used for a piece of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontKind {
    /// Proportional text face used for labels, bodies, options and footers.
    #[default]
    Serif,
    /// Fixed-width face used for tabular bodies.
    Mono,
}

/// Complete description of how a line of text is measured and drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextStyle {
    pub font: FontKind,
    pub emphasis: FontStyle,
    pub size_pt: u8,
    pub color: Option<(u8, u8, u8)>,
}

impl TextStyle {
    pub fn new(font: FontKind, emphasis: FontStyle, size_pt: u8) -> Self {
        Self {
            font,
            emphasis,
            size_pt,
            color: None,
        }
    }

    pub fn serif(size_pt: u8) -> Self {
        Self::new(FontKind::Serif, FontStyle::Normal, size_pt)
    }

    pub fn mono(size_pt: u8) -> Self {
        Self::new(FontKind::Mono, FontStyle::Normal, size_pt)
    }

    pub fn with_emphasis(mut self, emphasis: FontStyle) -> Self {
        self.emphasis = emphasis;
        self
    }

    pub fn bold(self) -> Self {
        self.with_emphasis(FontStyle::Bold)
    }

    pub fn with_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color = Some((r, g, b));
        self
    }
}

/// Source of horizontal text metrics.
pub trait TextMetrics {
    /// Width of `text` in millimetres when set in `style`.
    fn text_width(&self, text: &str, style: &TextStyle) -> f64;
}

impl<T: TextMetrics + ?Sized> TextMetrics for &T {
    fn text_width(&self, text: &str, style: &TextStyle) -> f64 {
        (**self).text_width(text, style)
    }
}

/// Font-free metrics where every glyph advances by a fixed fraction of the font size.
///
/// Useful for dry runs and for tests that must not depend on font files.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMetrics {
    /// Glyph advance for [`FontKind::Serif`], as a fraction of the em size.
    pub serif_advance: f64,
    /// Glyph advance for [`FontKind::Mono`], as a fraction of the em size.
    pub mono_advance: f64,
}

impl Default for FixedAdvanceMetrics {
    fn default() -> Self {
        Self {
            serif_advance: 0.5,
            mono_advance: 0.6,
        }
    }
}

impl TextMetrics for FixedAdvanceMetrics {
    fn text_width(&self, text: &str, style: &TextStyle) -> f64 {
        let advance = match style.font {
            FontKind::Serif => self.serif_advance,
            FontKind::Mono => self.mono_advance,
        };
        text.chars().count() as f64 * pt_to_mm(f64::from(style.size_pt)) * advance
    }
}

/// Lines produced by wrapping a text, together with the line height they occupy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub line_height: f64,
}

impl WrappedText {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }
}

/// Greedily wraps `text` into lines no wider than `width`.
///
/// Every `\n` starts a new line and an empty paragraph still occupies one (empty) line, so the
/// empty string wraps to a single line.  A word that does not fit on a line of its own is split at
/// character boundaries.
pub fn wrap_text<M: TextMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    style: &TextStyle,
    width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(metrics, paragraph, style, width, &mut lines);
    }
    lines
}

fn wrap_paragraph<M: TextMetrics + ?Sized>(
    metrics: &M,
    paragraph: &str,
    style: &TextStyle,
    width: f64,
    lines: &mut Vec<String>,
) {
    let mut current: Option<String> = None;

    for word in paragraph.split(' ') {
        if let Some(line) = current.as_mut() {
            let candidate = format!("{line} {word}");
            if metrics.text_width(&candidate, style) <= width {
                *line = candidate;
                continue;
            }
            lines.push(std::mem::take(line));
        }

        if metrics.text_width(word, style) <= width {
            current = Some(word.to_string());
        } else {
            let mut pieces = split_long_word(metrics, word, style, width);
            let tail = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            current = Some(tail);
        }
    }

    lines.push(current.unwrap_or_default());
}

fn split_long_word<M: TextMetrics + ?Sized>(
    metrics: &M,
    word: &str,
    style: &TextStyle,
    width: f64,
) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if metrics.text_width(&piece, style) > width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    pieces.push(piece);
    pieces
}

/// Wraps `text` and pairs the lines with the line height of `style`.
pub fn wrap<M: TextMetrics + ?Sized>(
    metrics: &M,
    geometry: &PageGeometry,
    text: &str,
    style: &TextStyle,
    width: f64,
) -> WrappedText {
    WrappedText {
        lines: wrap_text(metrics, text, style, width),
        line_height: geometry.line_height(style.size_pt),
    }
}

/// Height of a token sequence wrapped at `width`: `line_count × line_height`.
pub fn measure_tokens<M: TextMetrics + ?Sized>(
    metrics: &M,
    geometry: &PageGeometry,
    tokens: &[TextToken],
    style: &TextStyle,
    width: f64,
) -> f64 {
    wrap(metrics, geometry, &plain_text(tokens), style, width).height()
}
