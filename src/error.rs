//! Error types for exam paper rendering.

use std::io;

use thiserror::Error;

/// Result type alias for exam paper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while laying out, rendering or exporting a paper.
#[derive(Error, Debug)]
pub enum Error {
    /// The font families could not be loaded.
    #[error("Failed to load fonts: {0}")]
    Font(#[source] genpdf::error::Error),

    /// The PDF backend failed while drawing or serialising.
    #[error("PDF rendering failed: {0}")]
    Render(#[source] genpdf::error::Error),

    /// A block is taller than an empty page and the oversize policy is `fail`.
    #[error(
        "Question {} needs {height:.1} mm but a page only holds {available:.1} mm",
        .index + 1
    )]
    BlockTooTall {
        /// Zero-based index of the offending record.
        index: usize,
        height: f64,
        available: f64,
    },

    /// A draw call referenced a page that does not exist.
    #[error("Page {page} does not exist (document has {page_count} pages)")]
    MissingPage { page: usize, page_count: usize },

    /// A `chrono` date format that cannot render a calendar date.
    #[error("Invalid date format {0:?}")]
    DateFormat(String),

    /// I/O error when reading input or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON input or a serialisation failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration file.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Embedding the question bookmarks failed.
    #[cfg(feature = "bookmarks")]
    #[error("Failed to add bookmarks: {0}")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}
