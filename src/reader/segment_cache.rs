//! Segments of consecutive pages and the single-slot cache holding one.

use std::ops::Range;

use crate::paginate::Paginator;

use super::Page;

/// Segment containing `page`.
pub fn segment_index_for(page: usize, segment_size: usize) -> usize {
    page / segment_size.max(1)
}

/// `segment_size` consecutive pages plus one page of halo on each side.
///
/// The halo lets the three-page window around a page at either edge of the
/// segment render without touching a neighbouring segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segment_index: usize,
    /// Pages this segment serves.
    pub pages: Range<usize>,
    /// Pages whose content is held: `pages` widened by the halo, clipped to the document.
    pub cached: Range<usize>,
    content: String,
    /// Byte offset of each cached page in `content`, followed by its length.
    offsets: Vec<usize>,
}

impl Segment {
    /// Cut segment `segment_index` out of a paginated text.
    pub fn from_paginator(paginator: &Paginator<'_>, segment_index: usize, segment_size: usize) -> Self {
        let total = paginator.total_pages();
        let start = (segment_index * segment_size).min(total);
        let end = (start + segment_size).min(total);
        let cached = start.saturating_sub(1)..(end + 1).min(total);

        Self {
            segment_index,
            pages: start..end,
            content: paginator.span(cached.start, cached.end).to_string(),
            offsets: paginator.span_offsets(cached.start, cached.end),
            cached,
        }
    }

    pub fn from_text(text: &str, segment_index: usize, segment_size: usize, chars_per_page: usize) -> Self {
        Self::from_paginator(&Paginator::new(text, chars_per_page), segment_index, segment_size)
    }

    /// True if `page` belongs to this segment (halo pages excluded).
    pub fn covers(&self, page: usize) -> bool {
        self.pages.contains(&page)
    }

    /// Content of any cached page, halo included.
    pub fn page(&self, page: usize) -> Option<&str> {
        if !self.cached.contains(&page) {
            return None;
        }
        let i = page - self.cached.start;
        Some(&self.content[self.offsets[i]..self.offsets[i + 1]])
    }

    /// Pages `page - 1`, `page` and `page + 1`, clipped to the document.
    ///
    /// `None` unless this segment covers `page`.
    pub fn window(&self, page: usize) -> Option<Vec<Page>> {
        if !self.covers(page) {
            return None;
        }
        let pages = (page.saturating_sub(1)..=page + 1)
            .filter_map(|i| {
                self.page(i).map(|content| Page {
                    index: i,
                    content: content.to_string(),
                })
            })
            .collect();
        Some(pages)
    }
}

/// Holds at most one [`Segment`]; loading another replaces it.
#[derive(Debug, Clone, Default)]
pub struct SegmentCache {
    slot: Option<Segment>,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached segment if it is `segment_index`.
    pub fn get(&self, segment_index: usize) -> Option<&Segment> {
        self.slot.as_ref().filter(|s| s.segment_index == segment_index)
    }

    pub fn current(&self) -> Option<&Segment> {
        self.slot.as_ref()
    }

    /// Store `segment`, returning the one it evicted.
    pub fn replace(&mut self, segment: Segment) -> Option<Segment> {
        self.slot.replace(segment)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
