//! Fixed-size character pagination.
//!
//! Pages are counted in characters, not bytes, so a page of Chinese text
//! and a page of English text hold the same number of code points.

use crate::error::{Error, Result};
use crate::util::round2;

/// Page arithmetic for a document, independent of its text.
///
/// This is all a reading client needs to know before any content is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct PaginationIndex {
    pub chars_per_page: usize,
    pub total_chars: usize,
    pub total_pages: usize,
}

impl PaginationIndex {
    /// Index for a text of `total_chars` characters.
    ///
    /// `chars_per_page` of zero is treated as one.
    pub fn from_len(total_chars: usize, chars_per_page: usize) -> Self {
        let chars_per_page = chars_per_page.max(1);
        Self {
            chars_per_page,
            total_chars,
            total_pages: total_chars.div_ceil(chars_per_page),
        }
    }

    /// Page containing the character at `offset`, clamped to the last page.
    pub fn page_for_char(&self, offset: usize) -> usize {
        (offset / self.chars_per_page).min(self.total_pages.saturating_sub(1))
    }

    /// Character offset where `page` starts.
    pub fn char_offset(&self, page: usize) -> usize {
        page * self.chars_per_page
    }

    pub fn contains(&self, page: usize) -> bool {
        page < self.total_pages
    }

    pub fn check(&self, page: usize) -> Result<()> {
        if self.contains(page) {
            Ok(())
        } else {
            Err(Error::PageOutOfRange {
                page,
                total_pages: self.total_pages,
            })
        }
    }

    /// Reading progress at `page`, as a percentage rounded to two decimals.
    pub fn progress_percent(&self, page: usize) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        round2(page as f64 / self.total_pages as f64 * 100.0)
    }
}

/// Slices a text into pages of `chars_per_page` characters.
///
/// Page start offsets are computed once in [`Paginator::new`]; every page
/// lookup afterwards is a slice.
#[derive(Debug, Clone)]
pub struct Paginator<'a> {
    text: &'a str,
    index: PaginationIndex,
    /// Byte offset of each page start, followed by `text.len()`.
    starts: Vec<usize>,
}

impl<'a> Paginator<'a> {
    pub fn new(text: &'a str, chars_per_page: usize) -> Self {
        let chars_per_page = chars_per_page.max(1);
        let mut starts: Vec<usize> = text
            .char_indices()
            .step_by(chars_per_page)
            .map(|(byte, _)| byte)
            .collect();
        let total_chars = match starts.last() {
            Some(&last) => (starts.len() - 1) * chars_per_page + text[last..].chars().count(),
            None => 0,
        };
        starts.push(text.len());

        Self {
            text,
            index: PaginationIndex::from_len(total_chars, chars_per_page),
            starts,
        }
    }

    pub fn index(&self) -> &PaginationIndex {
        &self.index
    }

    pub fn total_pages(&self) -> usize {
        self.index.total_pages
    }

    /// Content of page `page`, or `None` past the end.
    pub fn page(&self, page: usize) -> Option<&'a str> {
        if !self.index.contains(page) {
            return None;
        }
        Some(&self.text[self.starts[page]..self.starts[page + 1]])
    }

    /// Contiguous text of pages `first..last`, clipped to the document.
    pub fn span(&self, first: usize, last: usize) -> &'a str {
        let last = last.min(self.index.total_pages);
        let first = first.min(last);
        &self.text[self.starts[first]..self.starts[last]]
    }

    /// Byte offsets of page starts within [`span`](Self::span)`(first, last)`,
    /// followed by the span's length.
    pub fn span_offsets(&self, first: usize, last: usize) -> Vec<usize> {
        let last = last.min(self.index.total_pages);
        let first = first.min(last);
        let base = self.starts[first];
        self.starts[first..=last].iter().map(|s| s - base).collect()
    }

    pub fn pages(&self) -> impl Iterator<Item = &'a str> + '_ {
        (0..self.index.total_pages).filter_map(|i| self.page(i))
    }
}
