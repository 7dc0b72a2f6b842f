//! Normalisation of upstream-generated question text.

/// Paragraph separator that survives sanitising.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Normalises line endings and reflows soft line breaks.
///
/// `\r\n` and lone `\r` become `\n`, runs of spaces collapse to a single space,
/// a blank line (`\n\n`) is kept as a paragraph break and any other line break
/// turns into a space.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = collapse_spaces(&unified);

    collapsed
        .split(PARAGRAPH_BREAK)
        .map(|paragraph| paragraph.replace('\n', " "))
        .collect::<Vec<_>>()
        .join(PARAGRAPH_BREAK)
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !previous_space {
                out.push(ch);
            }
            previous_space = true;
        } else {
            out.push(ch);
            previous_space = false;
        }
    }
    out
}
