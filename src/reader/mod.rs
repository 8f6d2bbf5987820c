//! Paginated reading.
//!
//! A [`ReaderSession`] tracks where one reader is in one document. Page
//! content is served from a [`SegmentCache`] holding a single [`Segment`]
//! of consecutive pages, and the reader's position is saved through a
//! trailing [`Debouncer`].
//!
//! The session does no I/O of its own. Operations that need a segment
//! return a [`SegmentTicket`]; the caller loads it, either with
//! [`ReaderSession::load_segment`] or by fetching the bytes itself and
//! calling [`ReaderSession::complete_segment`].

mod debounce;
mod segment_cache;
mod session;

pub use debounce::Debouncer;
pub use segment_cache::{Segment, SegmentCache, segment_index_for};
pub use session::{Navigation, ReaderSession, SegmentCompletion, SegmentTicket, SessionState};

use crate::paginate::PaginationIndex;

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Page {
    /// 0-based page index.
    pub index: usize,
    pub content: String,
}

impl Page {
    /// 1-based page number, as shown to readers.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// A reader's saved position in a document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadingProgress {
    pub document_id: String,
    pub reader_id: String,
    pub current_page: usize,
    /// Character offset of the start of `current_page`.
    pub char_offset: usize,
    /// `current_page / total_pages * 100`, two decimals.
    pub progress_percent: f64,
    pub total_pages: usize,
    /// Milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl ReadingProgress {
    pub fn at(
        document_id: &str,
        reader_id: &str,
        page: usize,
        index: &PaginationIndex,
        updated_at: u64,
    ) -> Self {
        Self {
            document_id: document_id.to_string(),
            reader_id: reader_id.to_string(),
            current_page: page,
            char_offset: index.char_offset(page),
            progress_percent: index.progress_percent(page),
            total_pages: index.total_pages,
            updated_at,
        }
    }
}
