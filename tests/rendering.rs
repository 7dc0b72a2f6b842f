use chrono::NaiveDate;
use exam_paper::fonts::FontSearch;
use exam_paper::{ExamPaperBuilder, QuestionRecord};
use sha2::{Digest, Sha256};

fn sample_records() -> Vec<QuestionRecord> {
    vec![
        QuestionRecord::new("What is **2 + 2**?").with_options(["3", "4", "5"]),
        QuestionRecord::new("Read the table:\n\nName | Score\nAda | 9\nAlan | 8"),
        QuestionRecord::new("Explain why the sky appears blue. ".repeat(12)),
    ]
}

fn render_sample_pdf() -> Option<Vec<u8>> {
    if !FontSearch::new().serif_available() {
        return None;
    }

    let bytes = ExamPaperBuilder::new()
        .with_date(NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"))
        .render(&sample_records())
        .expect("render sample pdf")
        .bytes;

    Some(bytes)
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            if let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            {
                let start_index = offset + start_pos + start.len();
                if let Some(end_pos) = data[start_index..]
                    .windows(end.len())
                    .position(|window| window == end)
                {
                    for byte in &mut data[start_index..start_index + end_pos] {
                        if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                            *byte = b'0';
                        }
                    }
                    offset = start_index + end_pos + end.len();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(
        &mut normalized,
        b"<xmp:MetadataDate>",
        b"</xmp:MetadataDate>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:DocumentID>",
        b"</xmpMM:DocumentID>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:InstanceID>",
        b"</xmpMM:InstanceID>",
    );
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

const SKIP_HINT: &str =
    "fonts missing. Set EXAM_PAPER_FONTS_DIR or copy assets/fonts next to the binary.";

#[test]
fn renders_non_empty_output() {
    let Some(bytes) = render_sample_pdf() else {
        eprintln!("Skipping renders_non_empty_output: {SKIP_HINT}");
        return;
    };
    assert!(bytes.starts_with(b"%PDF"), "output should be a PDF document");
}

#[test]
fn rendering_is_deterministic() {
    let (Some(bytes_a), Some(bytes_b)) = (render_sample_pdf(), render_sample_pdf()) else {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_HINT}");
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn rendered_file_is_named_after_the_date() {
    if !FontSearch::new().serif_available() {
        eprintln!("Skipping rendered_file_is_named_after_the_date: {SKIP_HINT}");
        return;
    }
    let paper = ExamPaperBuilder::new()
        .with_date(NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"))
        .render(&sample_records())
        .expect("render");
    assert_eq!(paper.file_name, "exam-paper-v2-2026-10-19.pdf");
    assert_eq!(paper.report.placements.len(), 3);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = paper.save_to(dir.path()).expect("save pdf");
    assert_eq!(std::fs::read(path).expect("read back"), paper.bytes);
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_add_an_outline() {
    if !FontSearch::new().serif_available() {
        eprintln!("Skipping bookmarks_add_an_outline: {SKIP_HINT}");
        return;
    }
    let paper = ExamPaperBuilder::new()
        .render_with_bookmarks(&sample_records())
        .expect("render with bookmarks");
    let document = lopdf::Document::load_mem(&paper.bytes).expect("parse pdf");
    let root = document
        .trailer
        .get(b"Root")
        .and_then(lopdf::Object::as_reference)
        .expect("catalog reference");
    let catalog = document.get_dictionary(root).expect("catalog");
    assert!(catalog.has(b"Outlines"));
}
