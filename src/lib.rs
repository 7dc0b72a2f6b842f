//! Paginated exam-paper rendering.
//!
//! Question records are sanitised, tokenised for `**bold**` emphasis, measured, placed with
//! greedy page breaking and drawn onto A4 pages; a final pass stamps `Page i of N` footers.
//!
//! ```no_run
//! use exam_paper::{ExamPaperBuilder, QuestionRecord};
//!
//! let records = vec![QuestionRecord::new("What is 2 + 2?").with_options(["3", "4", "5"])];
//! let paper = ExamPaperBuilder::new().render(&records)?;
//! paper.save_to(".")?;
//! # Ok::<(), exam_paper::Error>(())
//! ```

pub mod builder;
pub mod canvas;
pub mod config;
pub mod error;
pub mod export;
pub mod flow;
pub mod fonts;
pub mod geometry;
pub mod layout;
pub mod measure;
pub mod model;
pub mod render;
pub mod richtext;
pub mod sanitize;
pub mod stamp;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{compose, BlockPlacement, ExamPaperBuilder, LayoutReport, RenderedPaper};
pub use error::{Error, Result};
pub use flow::OversizePolicy;
pub use geometry::PageGeometry;
pub use model::{QuestionRecord, ResultEntry, Summary};
