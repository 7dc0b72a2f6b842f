//! Second pass over finished pages: footer date and page numbers, optional header title.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::geometry::PageGeometry;
use crate::measure::TextStyle;

/// Default `chrono` format for the footer date, e.g. `10/19/2026`.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

const FOOTER_GREY: (u8, u8, u8) = (102, 102, 102);

/// Text stamped on every page once the page count is final.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageStamp {
    /// Already formatted date shown as `Generated on {date}`.
    pub date: String,
    /// Title centred in the header band; the header stays empty when `None`.
    pub title: Option<String>,
}

impl PageStamp {
    /// Formats `date` with a `chrono` format string.
    pub fn new(date: NaiveDate, format: &str) -> Result<Self> {
        Ok(Self {
            date: format_date(date, format)?,
            title: None,
        })
    }

    /// Sets the header title and returns the updated stamp.
    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }
}

/// Rejects formats containing specifiers `chrono` does not know.
pub fn check_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::DateFormat(format.to_string()));
    }
    Ok(())
}

/// Formats `date`, returning an error for formats that need a time or a zone (`%H`, `%Z`).
pub fn format_date(date: NaiveDate, format: &str) -> Result<String> {
    check_date_format(format)?;
    let mut text = String::new();
    write!(text, "{}", date.format(format)).map_err(|_| Error::DateFormat(format.to_string()))?;
    Ok(text)
}

/// Returns `Page {page} of {total}`.
pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}

/// Writes the footer on every page of `canvas`, and the header title when one is set.
///
/// Must run after every block is placed: the total in `Page i of N` is read from the canvas.
pub fn stamp_pages<C: Canvas + ?Sized>(
    canvas: &mut C,
    geometry: &PageGeometry,
    stamp: &PageStamp,
) -> Result<()> {
    let total = canvas.page_count();
    let footer_style = {
        let (r, g, b) = FOOTER_GREY;
        TextStyle::serif(geometry.footer_font_pt).with_color(r, g, b)
    };
    let footer_line = geometry.line_height(footer_style.size_pt);
    let footer_top = geometry.page_height - geometry.footer_height / 2.0 - footer_line / 2.0;
    let right_edge = geometry.page_width - geometry.margin_right;

    let date_text = format!("Generated on {}", stamp.date);

    for page in 1..=total {
        canvas.draw_text(
            page,
            geometry.margin_left,
            footer_top,
            &date_text,
            &footer_style,
        )?;

        let label = page_label(page, total);
        let width = canvas.text_width(&label, &footer_style);
        canvas.draw_text(page, right_edge - width, footer_top, &label, &footer_style)?;

        if let Some(title) = &stamp.title {
            let header_style = TextStyle::serif(geometry.footer_font_pt);
            let header_line = geometry.line_height(header_style.size_pt);
            let width = canvas.text_width(title, &header_style);
            let x = (geometry.page_width - width) / 2.0;
            let top = (geometry.header_height - header_line) / 2.0;
            canvas.draw_text(page, x, top, title, &header_style)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::measure::TextMetrics;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).expect("valid date")
    }

    fn stamp() -> PageStamp {
        PageStamp::new(date(), DEFAULT_DATE_FORMAT).expect("default format")
    }

    #[test]
    fn date_uses_configured_format() {
        assert_eq!(stamp().date, "3/7/2026");
        let iso = PageStamp::new(date(), "%Y-%m-%d").expect("iso format");
        assert_eq!(iso.date, "2026-03-07");
    }

    #[test]
    fn bad_date_formats_are_errors() {
        for format in ["%Q", "%Y-%", "%H:%M"] {
            let err = PageStamp::new(date(), format).unwrap_err();
            assert!(matches!(err, Error::DateFormat(ref f) if f == format), "{format}");
        }
        assert!(check_date_format("%d %B %Y").is_ok());
    }

    #[test]
    fn every_page_gets_the_same_total() {
        let geometry = PageGeometry::A4;
        let mut canvas = RecordingCanvas::default();
        canvas.add_page().expect("page 2");
        canvas.add_page().expect("page 3");
        stamp_pages(&mut canvas, &geometry, &stamp()).expect("stamp");

        for page in 1..=3 {
            let label = page_label(page, 3);
            let op = canvas.find(&label).expect("page label");
            assert_eq!(op.page, page);
            let right = op.x + canvas.text_width(&op.text, &op.style);
            assert!((right - 190.0).abs() < 1e-9);
            assert!(op.y > geometry.body_end_y());
            assert!(op.y + geometry.line_height(9) <= geometry.page_height);
        }
        assert_eq!(
            canvas
                .ops()
                .iter()
                .filter(|op| op.text == "Generated on 3/7/2026")
                .count(),
            3
        );
    }

    #[test]
    fn title_is_drawn_inside_the_header_band() {
        let geometry = PageGeometry::A4;
        let mut canvas = RecordingCanvas::default();
        let stamp = stamp().with_title(Some("Mock Exam".to_string()));
        stamp_pages(&mut canvas, &geometry, &stamp).expect("stamp");

        let op = canvas.find("Mock Exam").expect("title drawn");
        assert!(op.y >= 0.0);
        assert!(op.y + geometry.line_height(9) <= geometry.header_height);
    }
}
