//! Paragraph chunking for documents without recognizable headings.

use log::debug;

use super::{ChapterBoundary, line_spans};

/// Strategy name reported when chunking was used.
pub const FALLBACK_STRATEGY: &str = "paragraph_chunks";

/// Paragraphs per pseudo-chapter for a given paragraph count.
pub fn chunk_size(paragraphs: usize) -> usize {
    match paragraphs {
        0..=50 => 5,
        51..=200 => 10,
        _ => 20,
    }
}

/// Byte offsets at which paragraphs start.
///
/// Paragraphs are delimited by blank lines. Sanitized text has none, so in
/// that case each line counts as a paragraph.
pub fn paragraph_starts(text: &str, max_paragraphs: usize) -> Vec<usize> {
    let has_blank_lines = text.trim().split('\n').any(|line| line.trim().is_empty());

    let mut starts = Vec::new();
    let mut after_blank = true;
    for (offset, line) in line_spans(text) {
        if starts.len() >= max_paragraphs {
            break;
        }
        if line.trim().is_empty() {
            after_blank = true;
            continue;
        }
        if after_blank || !has_blank_lines {
            starts.push(offset);
        }
        after_blank = false;
    }
    starts
}

/// One [`BoundaryKind::Chunk`](super::BoundaryKind::Chunk) boundary per group of paragraphs.
///
/// Paragraphs past `max_paragraphs` are not inspected; they end up in the
/// last chunk, whose content runs to the end of the text.
pub fn chunk_boundaries(text: &str, max_paragraphs: usize) -> Vec<ChapterBoundary> {
    let starts = paragraph_starts(text, max_paragraphs);
    let size = chunk_size(starts.len());
    debug!(
        "chunking {} paragraphs into groups of {}",
        starts.len(),
        size
    );
    starts
        .iter()
        .step_by(size)
        .map(|&offset| ChapterBoundary::chunk(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_tiers() {
        assert_eq!(chunk_size(1), 5);
        assert_eq!(chunk_size(50), 5);
        assert_eq!(chunk_size(51), 10);
        assert_eq!(chunk_size(200), 10);
        assert_eq!(chunk_size(201), 20);
    }

    #[test]
    fn test_blank_line_paragraphs() {
        let text = "one\ncontinued\n\ntwo\n\n\nthree";
        assert_eq!(paragraph_starts(text, 100), vec![0, 15, 21]);
    }

    #[test]
    fn test_lines_are_paragraphs_without_blank_lines() {
        let text = "a\nb\nc";
        assert_eq!(paragraph_starts(text, 100), vec![0, 2, 4]);
    }

    #[test]
    fn test_paragraph_cap() {
        let text = "a\nb\nc\nd";
        assert_eq!(paragraph_starts(text, 2), vec![0, 2]);
    }

    #[test]
    fn test_chunks_of_five() {
        let text: Vec<String> = (0..12).map(|i| format!("line {i}")).collect();
        let text = text.join("\n");
        let chunks = chunk_boundaries(&text, 1000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[1].offset, text.find("line 5").unwrap());
        assert_eq!(chunks[2].offset, text.find("line 10").unwrap());
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_boundaries("", 1000).is_empty());
    }
}
