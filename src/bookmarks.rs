//! PDF outline entries for questions, built on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use thiserror::Error;

use crate::builder::LayoutReport;
use crate::layout::question_label;
use crate::model::QuestionRecord;
use crate::richtext::{plain_text, tokenize};
use crate::sanitize::sanitize;

const TITLE_EXCERPT_CHARS: usize = 48;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    #[error("Failed to process PDF bytes: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Failed to write PDF bytes: {0}")]
    Io(#[from] std::io::Error),
    /// The trailer has no usable `/Root` catalog.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A bookmark points at a page the document does not have.
    #[error("Bookmark {entry_index} refers to missing page {page_number}")]
    MissingPage {
        entry_index: usize,
        page_number: usize,
    },
}

/// One outline entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookmarkEntry {
    pub title: String,
    /// One-based page the entry jumps to.
    pub page: usize,
}

/// Builds `Q{n}. excerpt…` entries pointing at the page each question starts on.
pub fn question_bookmarks(records: &[QuestionRecord], report: &LayoutReport) -> Vec<BookmarkEntry> {
    report
        .placements
        .iter()
        .filter_map(|placement| {
            let record = records.get(placement.index)?;
            let text = plain_text(&tokenize(&sanitize(record.text())));
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let mut excerpt: String = text.chars().take(TITLE_EXCERPT_CHARS).collect();
            if text.chars().count() > TITLE_EXCERPT_CHARS {
                excerpt.push('…');
            }
            let label = question_label(placement.index);
            let title = if excerpt.is_empty() {
                label
            } else {
                format!("{label} {excerpt}")
            };
            Some(BookmarkEntry {
                title,
                page: placement.page,
            })
        })
        .collect()
}

/// Adds a flat `/Outlines` tree with one `/Dest [page /Fit]` entry per bookmark.
pub fn apply_bookmarks(
    pdf_bytes: &[u8],
    bookmarks: &[BookmarkEntry],
) -> Result<Vec<u8>, BookmarkError> {
    if bookmarks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let mut entries = collect_outline_entries(&mut document, bookmarks, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut entries);
    insert_outlines_root(outlines_id, &mut document, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    bookmarks: &[BookmarkEntry],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    let mut entries = Vec::with_capacity(bookmarks.len());

    for (index, bookmark) in bookmarks.iter().enumerate() {
        let page_ref = u32::try_from(bookmark.page)
            .ok()
            .and_then(|page| pages.get(&page).copied())
            .ok_or(BookmarkError::MissingPage {
                entry_index: index,
                page_number: bookmark.page,
            })?;

        entries.push(OutlineEntry {
            object_id: document.new_object_id(),
            page_ref,
            title: bookmark.title.clone(),
        });
    }

    Ok(entries)
}

fn link_outline_entries(outlines_id: ObjectId, document: &mut Document, entries: &mut [OutlineEntry]) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", text_string(&entries[index].title));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

/// Encodes an outline title as a PDF text string: literal for ASCII, UTF-16BE with a BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}
