//! Inline emphasis for question text.
//!
//! Question bodies support a single markup construct, `**bold**`.  The tokenizer in this module is
//! deliberately flat: there is no nesting, no italic marker and no escaping.  An opening `**`
//! without a matching closer is kept as literal text instead of being rejected, so generated text
//! with stray asterisks still renders.
//!
//! The resulting [`TextToken`]s are consumed by the measurer and the block renderer; they are never
//! persisted.

use genpdf::style::Style;

const BOLD_MARKER: &str = "**";

/// Font style attached to a [`TextToken`].
///
/// Only [`FontStyle::Normal`] and [`FontStyle::Bold`] are produced by [`tokenize`]; the italic
/// variants exist so render styles can express them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    /// Applies the weight and slant flags to a `genpdf` style.
    pub fn apply(self, mut style: Style) -> Style {
        if self.is_bold() {
            style.set_bold();
        }
        if self.is_italic() {
            style.set_italic();
        }
        style
    }
}

/// A run of text sharing one font style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextToken {
    text: String,
    style: FontStyle,
}

impl TextToken {
    pub fn new(text: impl Into<String>, style: FontStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Shorthand for a [`FontStyle::Normal`] token.
    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(text, FontStyle::Normal)
    }

    /// Shorthand for a [`FontStyle::Bold`] token.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text, FontStyle::Bold)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }
}

/// Splits `input` into alternating normal and bold runs.
///
/// Matching is non-greedy: `**a** and **b**` yields two bold tokens.  Literal text between
/// matches becomes [`FontStyle::Normal`] tokens and no literal text is dropped.
pub fn tokenize(input: &str) -> Vec<TextToken> {
    let mut tokens = Vec::new();
    let mut index = 0;
    let mut literal_start = 0;

    while let Some(open) = input[index..].find(BOLD_MARKER) {
        let open = index + open;
        let content_start = open + BOLD_MARKER.len();
        let Some(close) = input[content_start..].find(BOLD_MARKER) else {
            break;
        };
        let close = content_start + close;

        // Emphasis never spans a line break; retry from the next character.
        if input[content_start..close].contains('\n') {
            index = open + 1;
            continue;
        }

        if open > literal_start {
            tokens.push(TextToken::normal(&input[literal_start..open]));
        }
        tokens.push(TextToken::bold(&input[content_start..close]));

        index = close + BOLD_MARKER.len();
        literal_start = index;
    }

    if literal_start < input.len() {
        tokens.push(TextToken::normal(&input[literal_start..]));
    }

    tokens
}

/// Concatenates the token text, dropping style information.
pub fn plain_text(tokens: &[TextToken]) -> String {
    tokens.iter().map(TextToken::text).collect()
}

/// Returns `true` when the tokens consist of exactly one bold run.
pub fn is_whole_bold(tokens: &[TextToken]) -> bool {
    matches!(tokens, [only] if only.style().is_bold())
}
