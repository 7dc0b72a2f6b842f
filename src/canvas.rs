//! Drawing surfaces for laid-out pages.
//!
//! The renderer and the stamper only ever place single lines of text at absolute page
//! coordinates, so a [`Canvas`] needs three operations: add a page, count pages and draw a line.
//! Coordinates are millimetres from the top-left corner of the page and `y` is the top of the
//! line box.
//!
//! [`GenpdfCanvas`] draws through `genpdf`'s low-level renderer.  [`RecordingCanvas`] keeps the
//! draw calls in memory and measures with [`FixedAdvanceMetrics`], which makes layouts
//! inspectable without any font files.

use genpdf::fonts::{Font, FontCache, FontFamily};
use genpdf::render::Renderer;
use genpdf::style::{Color, Style};
use genpdf::{Mm, Position, Size};

use crate::error::{Error, Result};
use crate::fonts::PaperFonts;
use crate::geometry::PageGeometry;
use crate::measure::{FixedAdvanceMetrics, FontKind, TextMetrics, TextStyle};

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// A page set that text lines can be drawn onto.
pub trait Canvas: TextMetrics {
    /// Number of pages currently in the document.
    fn page_count(&self) -> usize;

    /// Appends an empty page.
    fn add_page(&mut self) -> Result<()>;

    /// Draws one line of `text` with its top-left corner at (`x`, `y`) on the one-based `page`.
    fn draw_text(&mut self, page: usize, x: f64, y: f64, text: &str, style: &TextStyle)
        -> Result<()>;
}

/// Canvas backed by a `genpdf` [`Renderer`].
pub struct GenpdfCanvas {
    renderer: Renderer,
    font_cache: FontCache,
    serif: FontFamily<Font>,
    mono: FontFamily<Font>,
    page_size: Size,
}

impl GenpdfCanvas {
    /// Creates a one-page document of the geometry's page size with the given fonts embedded.
    pub fn new(fonts: PaperFonts, geometry: &PageGeometry, title: &str) -> Result<Self> {
        let page_size = Size::new(
            mm_from_f64(geometry.page_width),
            mm_from_f64(geometry.page_height),
        );
        let renderer = Renderer::new(page_size, title).map_err(Error::Render)?;

        let PaperFonts { serif, mono } = fonts;
        let mut font_cache = FontCache::new(serif);
        let serif = font_cache.default_font_family();
        let mono = match mono {
            Some(mono) => font_cache.add_font_family(mono),
            None => serif,
        };
        font_cache
            .load_pdf_fonts(&renderer)
            .map_err(Error::Render)?;

        Ok(Self {
            renderer,
            font_cache,
            serif,
            mono,
            page_size,
        })
    }

    fn style(&self, style: &TextStyle) -> Style {
        let family = match style.font {
            FontKind::Serif => self.serif,
            FontKind::Mono => self.mono,
        };
        let mut out = style
            .emphasis
            .apply(Style::new().with_font_family(family))
            .with_font_size(style.size_pt);
        if let Some((r, g, b)) = style.color {
            out.set_color(Color::Rgb(r, g, b));
        }
        out
    }

    /// Serialises the finished document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.renderer.write(&mut bytes).map_err(Error::Render)?;
        Ok(bytes)
    }
}

impl TextMetrics for GenpdfCanvas {
    fn text_width(&self, text: &str, style: &TextStyle) -> f64 {
        mm_to_f64(self.style(style).str_width(&self.font_cache, text))
    }
}

impl Canvas for GenpdfCanvas {
    fn page_count(&self) -> usize {
        self.renderer.page_count()
    }

    fn add_page(&mut self) -> Result<()> {
        self.renderer.add_page(self.page_size);
        Ok(())
    }

    fn draw_text(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        text: &str,
        style: &TextStyle,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let pdf_style = self.style(style);
        let target = page
            .checked_sub(1)
            .and_then(|index| self.renderer.get_page(index))
            .ok_or(Error::MissingPage {
                page,
                page_count: self.renderer.page_count(),
            })?;
        let area = target.first_layer().area();
        let printed = area
            .print_str(
                &self.font_cache,
                Position::new(mm_from_f64(x), mm_from_f64(y)),
                pdf_style,
                text,
            )
            .map_err(Error::Render)?;
        if !printed {
            log::warn!("text at ({x:.1}, {y:.1}) on page {page} fell outside the page");
        }
        Ok(())
    }
}

/// One recorded [`Canvas::draw_text`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawOp {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub style: TextStyle,
}

/// In-memory canvas that records draw calls.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    metrics: FixedAdvanceMetrics,
    pages: usize,
    ops: Vec<DrawOp>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new(FixedAdvanceMetrics::default())
    }
}

impl RecordingCanvas {
    /// Creates a one-page recording canvas measuring with `metrics`.
    pub fn new(metrics: FixedAdvanceMetrics) -> Self {
        Self {
            metrics,
            pages: 1,
            ops: Vec::new(),
        }
    }

    /// All draw calls in call order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Draw calls that landed on the one-based `page`.
    pub fn ops_on_page(&self, page: usize) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(move |op| op.page == page)
    }

    /// The first draw call whose text equals `text`.
    pub fn find(&self, text: &str) -> Option<&DrawOp> {
        self.ops.iter().find(|op| op.text == text)
    }
}

impl TextMetrics for RecordingCanvas {
    fn text_width(&self, text: &str, style: &TextStyle) -> f64 {
        self.metrics.text_width(text, style)
    }
}

impl Canvas for RecordingCanvas {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn add_page(&mut self) -> Result<()> {
        self.pages += 1;
        Ok(())
    }

    fn draw_text(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        text: &str,
        style: &TextStyle,
    ) -> Result<()> {
        if page == 0 || page > self.pages {
            return Err(Error::MissingPage {
                page,
                page_count: self.pages,
            });
        }
        self.ops.push(DrawOp {
            page,
            x,
            y,
            text: text.to_string(),
            style: *style,
        });
        Ok(())
    }
}
