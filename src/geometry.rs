//! Page geometry shared by the planner, the flow controller and the renderers.
//!
//! All lengths are millimetres unless the field name says otherwise.  The values
//! of [`PageGeometry::A4`] must stay bit-exact: documents laid out by earlier
//! releases are expected to break on the same lines and pages.

/// Conversion factor from typographic points to millimetres.
pub const PT_TO_MM: f64 = 0.352778;

/// Converts a length in points to millimetres.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt * PT_TO_MM
}

/// Static layout constants for one page format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub header_height: f64,
    pub footer_height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Space between the header band and the first body line.
    pub body_top_margin: f64,
    /// Space between the last body line and the footer band.
    pub body_bottom_margin: f64,
    pub body_font_pt: u8,
    pub heading_font_pt: u8,
    pub footer_font_pt: u8,
    pub mono_font_pt: u8,
    pub line_spacing: f64,
    pub option_indent: f64,
    pub option_padding: f64,
    pub question_gap_pt: f64,
    pub label_gap_pt: f64,
    pub body_gap_pt: f64,
}

impl PageGeometry {
    /// A4 portrait with a 15 mm header band and an 18 mm footer band.
    pub const A4: PageGeometry = PageGeometry {
        page_width: 210.0,
        page_height: 297.0,
        header_height: 15.0,
        footer_height: 18.0,
        margin_left: 20.0,
        margin_right: 20.0,
        body_top_margin: 10.0,
        body_bottom_margin: 10.0,
        body_font_pt: 11,
        heading_font_pt: 12,
        footer_font_pt: 9,
        mono_font_pt: 10,
        line_spacing: 1.3,
        option_indent: 12.0,
        option_padding: 2.0,
        question_gap_pt: 12.0,
        label_gap_pt: 4.0,
        body_gap_pt: 8.0,
    };

    pub fn content_width(&self) -> f64 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Top of the body region (25 mm on A4).
    pub fn body_start_y(&self) -> f64 {
        self.header_height + self.body_top_margin
    }

    /// Bottom of the body region (269 mm on A4).
    pub fn body_end_y(&self) -> f64 {
        self.page_height - self.footer_height - self.body_bottom_margin
    }

    /// Vertical space available to content on a single page.
    pub fn safe_body_height(&self) -> f64 {
        self.body_end_y() - self.body_start_y()
    }

    /// Height of one text line set at `size_pt`.
    pub fn line_height(&self, size_pt: u8) -> f64 {
        pt_to_mm(f64::from(size_pt)) * self.line_spacing
    }

    /// Width available to wrapped option text once the hanging indent is taken.
    pub fn option_text_width(&self) -> f64 {
        self.content_width() - self.option_indent
    }

    pub fn question_gap(&self) -> f64 {
        pt_to_mm(self.question_gap_pt)
    }

    pub fn label_gap(&self) -> f64 {
        pt_to_mm(self.label_gap_pt)
    }

    pub fn body_gap(&self) -> f64 {
        pt_to_mm(self.body_gap_pt)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_body_region_matches_reserved_bands() {
        let geometry = PageGeometry::A4;
        assert_eq!(geometry.content_width(), 170.0);
        assert_eq!(geometry.body_start_y(), 25.0);
        assert_eq!(geometry.body_end_y(), 269.0);
        assert_eq!(geometry.safe_body_height(), 244.0);
        assert_eq!(geometry.option_text_width(), 158.0);
    }

    #[test]
    fn line_height_uses_spacing_multiplier() {
        let geometry = PageGeometry::A4;
        let expected = 11.0 * PT_TO_MM * 1.3;
        assert!((geometry.line_height(11) - expected).abs() < 1e-12);
        assert!((geometry.question_gap() - 12.0 * PT_TO_MM).abs() < 1e-12);
    }
}
