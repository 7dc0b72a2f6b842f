//! Page breaking.
//!
//! A [`LayoutSession`] is the single owner of the write cursor for one document.  For every block
//! it makes a two-way decision, "fits on the current page" or "needs a new page", from the block's
//! pre-measured height.  There is no lookahead and no page balancing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::PageGeometry;
use crate::layout::MeasuredBlock;

/// Position of the write cursor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PageCursor {
    /// One-based page index.
    pub page_index: usize,
    /// Distance from the top edge of the page, in millimetres.
    pub y: f64,
}

/// What to do with a block taller than the safe body height of an empty page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Start the block on a fresh page, draw it up to the body limit and close it with an
    /// overflow marker.
    #[default]
    Truncate,
    /// Abort the layout pass with [`Error::BlockTooTall`].
    Fail,
}

/// Where a block was placed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    /// One-based page the block starts on.
    pub page: usize,
    /// Top of the block's first line.
    pub y: f64,
    /// Whether a page break happened right before this block.
    pub new_page: bool,
    /// Lowest y the block may draw to when it is cut short, `None` when it fits.
    pub clip_at: Option<f64>,
}

/// Owns the cursor and page counter for one layout pass.
#[derive(Debug)]
pub struct LayoutSession {
    geometry: PageGeometry,
    policy: OversizePolicy,
    cursor: PageCursor,
    blocks_on_page: usize,
}

impl LayoutSession {
    pub fn new(geometry: PageGeometry, policy: OversizePolicy) -> Self {
        Self {
            cursor: PageCursor {
                page_index: 1,
                y: geometry.body_start_y(),
            },
            geometry,
            policy,
            blocks_on_page: 0,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Number of pages started so far; final once every block is placed.
    pub fn page_count(&self) -> usize {
        self.cursor.page_index
    }

    fn page_is_empty(&self) -> bool {
        self.cursor.y <= self.geometry.body_start_y()
    }

    fn break_page(&mut self) {
        self.cursor.page_index += 1;
        self.cursor.y = self.geometry.body_start_y();
        self.blocks_on_page = 0;
        debug!("page break, now on page {}", self.cursor.page_index);
    }

    /// Decides where the block with zero-based `index` starts and moves the cursor there.
    pub fn place(&mut self, index: usize, block: &MeasuredBlock) -> Result<Placement> {
        // The leading gap is only drawn between blocks, never at the top of a page.
        let height = block.content_height();
        let available = self.geometry.safe_body_height();
        let body_end = self.geometry.body_end_y();
        let mut new_page = false;
        let mut clip_at = None;

        if height > available {
            if self.policy == OversizePolicy::Fail {
                return Err(Error::BlockTooTall {
                    index,
                    height,
                    available,
                });
            }
            warn!(
                "question {} needs {:.1} mm but a page holds {:.1} mm; truncating",
                index + 1,
                height,
                available
            );
            if !self.page_is_empty() {
                self.break_page();
                new_page = true;
            }
            clip_at = Some(body_end);
        } else if !self.page_is_empty() {
            if self.cursor.y + block.total_height > body_end {
                self.break_page();
                new_page = true;
            } else {
                self.cursor.y += block.gap_before;
            }
        }

        self.blocks_on_page += 1;
        debug!(
            "question {} placed on page {} at {:.2} mm ({:.2} mm tall)",
            index + 1,
            self.cursor.page_index,
            self.cursor.y,
            height
        );

        Ok(Placement {
            page: self.cursor.page_index,
            y: self.cursor.y,
            new_page,
            clip_at,
        })
    }

    /// Moves the cursor down by `height` after a block has been drawn.
    ///
    /// The cursor never moves past the body end, which only matters for truncated blocks.
    pub fn advance(&mut self, height: f64) {
        self.cursor.y = (self.cursor.y + height).min(self.geometry.body_end_y());
    }

    /// Number of blocks placed on the current page.
    pub fn blocks_on_page(&self) -> usize {
        self.blocks_on_page
    }
}
