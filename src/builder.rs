//! Exam paper construction.
//!
//! [`ExamPaperBuilder`] collects the document settings and runs the single layout pass:
//! every record is planned, placed and drawn in input order, then the page stamps are written
//! once the page count is final.  [`compose`] is the pass itself and works on any [`Canvas`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;

use crate::canvas::{Canvas, GenpdfCanvas, RecordingCanvas};
use crate::config::PaperConfig;
use crate::error::{Error, Result};
use crate::export::paper_file_name;
use crate::flow::{LayoutSession, OversizePolicy};
use crate::fonts::FontSearch;
use crate::geometry::PageGeometry;
use crate::layout::plan_block;
use crate::model::QuestionRecord;
use crate::render::render_block;
use crate::stamp::{stamp_pages, PageStamp, DEFAULT_DATE_FORMAT};

/// Title embedded in the PDF metadata when none is configured.
pub const DEFAULT_DOCUMENT_TITLE: &str = "Exam Paper";

/// Where one question ended up.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockPlacement {
    /// Zero-based record index.
    pub index: usize,
    /// One-based page the block starts on.
    pub page: usize,
    /// Top of the block's first line, in millimetres from the top of the page.
    pub y: f64,
    /// Planned height including the leading gap.
    pub height: f64,
    pub truncated: bool,
}

/// Outcome of a layout pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LayoutReport {
    pub page_count: usize,
    pub placements: Vec<BlockPlacement>,
}

/// Lays out `records` on `canvas` and stamps every page.
pub fn compose<C: Canvas + ?Sized>(
    canvas: &mut C,
    records: &[QuestionRecord],
    geometry: &PageGeometry,
    policy: OversizePolicy,
    stamp: &PageStamp,
) -> Result<LayoutReport> {
    let mut session = LayoutSession::new(*geometry, policy);
    let mut placements = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let block = plan_block(index, record, &*canvas, geometry);
        let placement = session.place(index, &block.measured)?;
        while canvas.page_count() < placement.page {
            canvas.add_page()?;
        }
        let truncated = render_block(canvas, &mut session, &block, &placement)?;
        placements.push(BlockPlacement {
            index,
            page: placement.page,
            y: placement.y,
            height: block.measured.total_height,
            truncated,
        });
    }

    let page_count = session.page_count();
    debug_assert_eq!(page_count, canvas.page_count());
    stamp_pages(canvas, geometry, stamp)?;

    info!(
        "laid out {} questions on {} pages",
        records.len(),
        page_count
    );
    Ok(LayoutReport {
        page_count,
        placements,
    })
}

/// A rendered PDF together with its layout.
#[derive(Clone, Debug)]
pub struct RenderedPaper {
    pub bytes: Vec<u8>,
    pub report: LayoutReport,
    /// `exam-paper-v2-<date>.pdf`.
    pub file_name: String,
}

impl RenderedPaper {
    /// Writes the PDF into `directory` under [`RenderedPaper::file_name`].
    pub fn save_to(&self, directory: impl AsRef<Path>) -> Result<PathBuf> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        let path = directory.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Builder for exam paper documents.
#[derive(Clone, Debug)]
pub struct ExamPaperBuilder {
    geometry: PageGeometry,
    policy: OversizePolicy,
    title: Option<String>,
    date: Option<NaiveDate>,
    date_format: String,
    fonts: FontSearch,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Default for ExamPaperBuilder {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::A4,
            policy: OversizePolicy::default(),
            title: None,
            date: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            fonts: FontSearch::new(),
            today: local_today,
        }
    }
}

impl ExamPaperBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a loaded configuration file.
    pub fn from_config(config: &PaperConfig) -> Self {
        let mut builder = Self::new()
            .with_title(config.title.clone())
            .with_oversize_policy(config.oversize)
            .with_font_directory(config.fonts_dir.clone());
        if let Some(format) = &config.date_format {
            builder = builder.with_date_format(format.clone());
        }
        builder
    }

    /// Sets what happens to blocks taller than a page.
    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the title shown in the header band and stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    /// Fixes the generation date instead of using today's local date.
    pub fn with_date(mut self, date: impl Into<Option<NaiveDate>>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the `chrono` format of the footer date.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Adds a directory searched first for font files.
    pub fn with_font_directory(mut self, directory: impl Into<Option<PathBuf>>) -> Self {
        self.fonts = self.fonts.with_directory(directory);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Picks the generation date and builds the page stamp for it.
    ///
    /// Called once per pass so the footer and the file name always agree, even across midnight.
    fn dated_stamp(&self) -> Result<(NaiveDate, PageStamp)> {
        let date = self.date.unwrap_or_else(self.today);
        let stamp = PageStamp::new(date, &self.date_format)?.with_title(self.title.clone());
        Ok((date, stamp))
    }

    /// Runs the layout pass on `canvas`.
    pub fn compose_on<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        records: &[QuestionRecord],
    ) -> Result<LayoutReport> {
        let (_, stamp) = self.dated_stamp()?;
        compose(canvas, records, &self.geometry, self.policy, &stamp)
    }

    /// Lays out `records` on a [`RecordingCanvas`] without loading any fonts.
    pub fn preview(&self, records: &[QuestionRecord]) -> Result<(RecordingCanvas, LayoutReport)> {
        let mut canvas = RecordingCanvas::default();
        let report = self.compose_on(&mut canvas, records)?;
        Ok((canvas, report))
    }

    /// Renders `records` into a PDF document.
    pub fn render(&self, records: &[QuestionRecord]) -> Result<RenderedPaper> {
        let (date, stamp) = self.dated_stamp()?;
        let fonts = self.fonts.load().map_err(Error::Font)?;
        let title = self.title.as_deref().unwrap_or(DEFAULT_DOCUMENT_TITLE);
        let mut canvas = GenpdfCanvas::new(fonts, &self.geometry, title)?;
        let report = compose(&mut canvas, records, &self.geometry, self.policy, &stamp)?;

        Ok(RenderedPaper {
            bytes: canvas.finish()?,
            report,
            file_name: paper_file_name(date),
        })
    }

    /// Renders `records` and adds one PDF outline entry per question.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self, records: &[QuestionRecord]) -> Result<RenderedPaper> {
        let mut paper = self.render(records)?;
        let entries = crate::bookmarks::question_bookmarks(records, &paper.report);
        paper.bytes = crate::bookmarks::apply_bookmarks(&paper.bytes, &entries)?;
        Ok(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    #[test]
    fn preview_reports_every_record_in_order() {
        let records: Vec<_> = (0..5)
            .map(|i| QuestionRecord::new(format!("Question number {i}")))
            .collect();
        let (_, report) = ExamPaperBuilder::new()
            .with_date(date())
            .preview(&records)
            .expect("preview");
        assert_eq!(report.page_count, 1);
        let indices: Vec<_> = report.placements.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(report.placements.windows(2).all(|w| w[0].y < w[1].y));
    }

    #[test]
    fn empty_input_yields_one_stamped_page() {
        let (canvas, report) = ExamPaperBuilder::new()
            .with_date(date())
            .preview(&[])
            .expect("preview");
        assert_eq!(report.page_count, 1);
        assert!(canvas.find("Page 1 of 1").is_some());
        assert!(canvas.find("Generated on 10/19/2026").is_some());
    }

    #[test]
    fn fail_policy_surfaces_oversized_blocks() {
        let options: Vec<String> = (0..100).map(|i| format!("choice {i}")).collect();
        let records = vec![QuestionRecord::new("Huge").with_options(options)];
        let err = ExamPaperBuilder::new()
            .with_oversize_policy(OversizePolicy::Fail)
            .preview(&records)
            .unwrap_err();
        assert!(matches!(err, Error::BlockTooTall { index: 0, .. }));
    }

    #[test]
    fn generation_date_is_read_once_per_pass() {
        use std::sync::atomic::{AtomicU32, Ordering};

        static CALLS: AtomicU32 = AtomicU32::new(0);
        fn ticking_clock() -> NaiveDate {
            let day = CALLS.fetch_add(1, Ordering::SeqCst);
            date() + chrono::Days::new(u64::from(day))
        }

        let builder = ExamPaperBuilder {
            today: ticking_clock,
            ..ExamPaperBuilder::new()
        };
        let (resolved, stamp) = builder.dated_stamp().expect("stamp");
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(stamp.date, "10/19/2026");
        assert_eq!(paper_file_name(resolved), "exam-paper-v2-2026-10-19.pdf");

        let pinned = builder.with_date(date());
        pinned.dated_stamp().expect("stamp");
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_date_format_fails_before_layout() {
        let err = ExamPaperBuilder::new()
            .with_date_format("%Q")
            .preview(&[QuestionRecord::new("Q")])
            .unwrap_err();
        assert!(matches!(err, Error::DateFormat(_)));
    }

    #[test]
    fn config_values_flow_into_the_builder() {
        let config: PaperConfig = toml::from_str(
            r#"
            title = "Midterm"
            oversize = "fail"
            date_format = "%Y-%m-%d"
            "#,
        )
        .expect("parse config");
        let builder = ExamPaperBuilder::from_config(&config).with_date(date());
        assert_eq!(builder.policy, OversizePolicy::Fail);
        let (canvas, _) = builder.preview(&[]).expect("preview");
        assert!(canvas.find("Midterm").is_some());
        assert!(canvas.find("Generated on 2026-10-19").is_some());
    }
}
