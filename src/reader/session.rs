//! The reading session state machine.

use std::time::Instant;

use log::{debug, info, warn};

use crate::config::{DetectorConfig, PipelineConfig, ReaderConfig};
use crate::document::DocumentMeta;
use crate::encoding::EncodingDetector;
use crate::error::{Error, Result};
use crate::paginate::{PaginationIndex, Paginator};
use crate::sanitize::sanitize;
use crate::store::{DocumentStore, ProgressId, ProgressStore};
use crate::util::time_now_millis;

use super::segment_cache::{Segment, SegmentCache, segment_index_for};
use super::{Debouncer, Page, ReadingProgress};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    LoadingMeta,
    LoadingProgress,
    /// Waiting for the segment named by the pending [`SegmentTicket`].
    LoadingSegment,
    Ready,
    SavingProgress,
}

/// A request for one segment.
///
/// Only the most recently issued ticket can complete; older ones are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTicket {
    pub seq: u64,
    pub segment_index: usize,
}

/// Outcome of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The page was in the cached segment; here is its window.
    Rendered(Vec<Page>),
    /// The page needs another segment.
    Pending(SegmentTicket),
}

/// Outcome of delivering a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentCompletion {
    /// The segment was cached; here is the window around the current page.
    Applied(Vec<Page>),
    /// A newer request superseded this one; the segment was discarded.
    Stale,
}

/// One reader's session on one document.
#[derive(Debug)]
pub struct ReaderSession {
    document_id: String,
    reader_id: String,
    config: ReaderConfig,
    detector: DetectorConfig,
    state: SessionState,
    meta: Option<DocumentMeta>,
    index: PaginationIndex,
    current_page: usize,
    cache: SegmentCache,
    last_seq: u64,
    pending: Option<SegmentTicket>,
    saver: Debouncer<usize>,
    progress_id: Option<ProgressId>,
}

impl ReaderSession {
    /// Fails with [`Error::Config`] when `config` does not validate.
    pub fn new(
        document_id: impl Into<String>,
        reader_id: impl Into<String>,
        config: &PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            document_id: document_id.into(),
            reader_id: reader_id.into(),
            config: config.reader.clone(),
            detector: config.detector.clone(),
            state: SessionState::Idle,
            meta: None,
            index: PaginationIndex::from_len(0, config.pagination.chars_per_page),
            current_page: 0,
            cache: SegmentCache::new(),
            last_seq: 0,
            pending: None,
            saver: Debouncer::new(config.reader.save_debounce()),
            progress_id: None,
        })
    }

    /// Load metadata and saved progress, then request the starting segment.
    ///
    /// Starts at the saved page when one exists (clamped to the document),
    /// otherwise at page 0. A failing progress lookup is logged and treated
    /// as no saved progress.
    pub fn open<D, P>(&mut self, docs: &D, progress: &P) -> Result<Navigation>
    where
        D: DocumentStore + ?Sized,
        P: ProgressStore + ?Sized,
    {
        if self.state != SessionState::Idle {
            return Err(Error::InvalidState(format!(
                "open called while {:?}",
                self.state
            )));
        }

        self.state = SessionState::LoadingMeta;
        let meta = match docs.metadata(&self.document_id) {
            Ok(meta) => meta,
            Err(e) => {
                self.state = SessionState::Idle;
                return Err(e);
            }
        };
        let index = PaginationIndex::from_len(meta.total_chars, meta.chars_per_page);
        if index.total_pages == 0 {
            self.state = SessionState::Idle;
            return Err(Error::EmptyContent);
        }
        self.index = index;
        self.meta = Some(meta);

        self.state = SessionState::LoadingProgress;
        let start = match progress.find(&self.document_id, &self.reader_id) {
            Ok(Some((id, saved))) => {
                self.progress_id = Some(id);
                saved.current_page.min(index.total_pages - 1)
            }
            Ok(None) => 0,
            Err(e) => {
                warn!("could not load progress for {}: {e}", self.document_id);
                0
            }
        };
        info!(
            "opened {} at page {}/{}",
            self.document_id,
            start + 1,
            index.total_pages
        );

        self.current_page = start;
        Ok(self.show(start))
    }

    /// Move to `page`.
    ///
    /// Within the cached segment the window renders immediately. Otherwise a
    /// ticket for the new segment is returned and any earlier pending ticket
    /// becomes stale. Either way a progress save is scheduled.
    pub fn navigate(&mut self, page: usize, now: Instant) -> Result<Navigation> {
        match self.state {
            SessionState::Ready | SessionState::LoadingSegment => {}
            other => {
                return Err(Error::InvalidState(format!(
                    "cannot navigate while {other:?}"
                )));
            }
        }
        self.index.check(page)?;

        self.current_page = page;
        self.saver.schedule(page, now);
        Ok(self.show(page))
    }

    /// Navigate forward one page; `None` on the last page.
    pub fn next_page(&mut self, now: Instant) -> Result<Option<Navigation>> {
        let next = self.current_page + 1;
        if !self.index.contains(next) {
            return Ok(None);
        }
        self.navigate(next, now).map(Some)
    }

    /// Navigate back one page; `None` on the first page.
    pub fn previous_page(&mut self, now: Instant) -> Result<Option<Navigation>> {
        match self.current_page.checked_sub(1) {
            Some(previous) => self.navigate(previous, now).map(Some),
            None => Ok(None),
        }
    }

    fn show(&mut self, page: usize) -> Navigation {
        let segment_index = segment_index_for(page, self.config.segment_size);
        if let Some(segment) = self.cache.get(segment_index) {
            self.pending = None;
            self.state = SessionState::Ready;
            return Navigation::Rendered(segment.window(page).unwrap_or_default());
        }

        self.last_seq += 1;
        let ticket = SegmentTicket {
            seq: self.last_seq,
            segment_index,
        };
        debug!(
            "page {} needs segment {} (seq {})",
            page, segment_index, ticket.seq
        );
        self.pending = Some(ticket);
        self.state = SessionState::LoadingSegment;
        Navigation::Pending(ticket)
    }

    /// Build the segment for `ticket` from the document's original bytes.
    pub fn build_segment(&self, ticket: SegmentTicket, bytes: &[u8]) -> Segment {
        let decoded = EncodingDetector::with_config(self.detector.clone()).detect(bytes);
        let text = sanitize(&decoded.text);
        let paginator = Paginator::new(&text, self.index.chars_per_page);
        Segment::from_paginator(&paginator, ticket.segment_index, self.config.segment_size)
    }

    /// Deliver a segment requested by `ticket`.
    pub fn complete_segment(&mut self, ticket: SegmentTicket, segment: Segment) -> Result<SegmentCompletion> {
        if self.pending != Some(ticket) {
            debug!(
                "discarding stale segment {} (seq {})",
                ticket.segment_index, ticket.seq
            );
            return Ok(SegmentCompletion::Stale);
        }
        if segment.segment_index != ticket.segment_index {
            return Err(Error::InvalidState(format!(
                "ticket for segment {} completed with segment {}",
                ticket.segment_index, segment.segment_index
            )));
        }

        debug!(
            "cached segment {} (pages {:?})",
            segment.segment_index, segment.pages
        );
        self.cache.replace(segment);
        self.pending = None;
        self.state = SessionState::Ready;
        Ok(SegmentCompletion::Applied(self.window().unwrap_or_default()))
    }

    /// Fetch, decode and deliver the segment for `ticket` in one call.
    ///
    /// A fetch error leaves the session waiting on the same ticket so the
    /// caller can retry.
    pub fn load_segment<D>(&mut self, ticket: SegmentTicket, docs: &D) -> Result<SegmentCompletion>
    where
        D: DocumentStore + ?Sized,
    {
        if self.pending != Some(ticket) {
            return Ok(SegmentCompletion::Stale);
        }
        let bytes = docs.fetch(&self.document_id)?;
        let segment = self.build_segment(ticket, &bytes);
        self.complete_segment(ticket, segment)
    }

    /// Save progress if the debounce delay has elapsed. Returns whether a save succeeded.
    pub fn tick<P>(&mut self, now: Instant, store: &mut P) -> bool
    where
        P: ProgressStore + ?Sized,
    {
        match self.saver.take_due(now) {
            Some(page) => self.save(page, store),
            None => false,
        }
    }

    /// Save any pending progress immediately, e.g. when the reader closes the document.
    pub fn flush<P>(&mut self, store: &mut P) -> bool
    where
        P: ProgressStore + ?Sized,
    {
        match self.saver.take() {
            Some(page) => self.save(page, store),
            None => false,
        }
    }

    fn save<P>(&mut self, page: usize, store: &mut P) -> bool
    where
        P: ProgressStore + ?Sized,
    {
        let resume = self.state;
        self.state = SessionState::SavingProgress;
        let record = ReadingProgress::at(
            &self.document_id,
            &self.reader_id,
            page,
            &self.index,
            time_now_millis(),
        );
        let result = self.upsert(&record, store);
        self.state = resume;

        match result {
            Ok(()) => {
                debug!("saved progress for {} at page {}", self.document_id, page);
                true
            }
            Err(e) => {
                warn!("failed to save progress for {}: {e}", self.document_id);
                false
            }
        }
    }

    fn upsert<P>(&mut self, record: &ReadingProgress, store: &mut P) -> Result<()>
    where
        P: ProgressStore + ?Sized,
    {
        if let Some(id) = self.progress_id {
            match store.update(id, record) {
                Ok(()) => return Ok(()),
                Err(Error::NotFound(_)) => {
                    debug!("progress record {} vanished; looking it up again", id.0);
                    self.progress_id = None;
                }
                Err(e) => return Err(e),
            }
        }

        match store.find(&self.document_id, &self.reader_id)? {
            Some((id, _)) => {
                store.update(id, record)?;
                self.progress_id = Some(id);
            }
            None => {
                self.progress_id = Some(store.create(record)?);
            }
        }
        Ok(())
    }

    /// The three-page window around the current page, if its segment is cached.
    pub fn window(&self) -> Option<Vec<Page>> {
        let segment_index = segment_index_for(self.current_page, self.config.segment_size);
        self.cache.get(segment_index)?.window(self.current_page)
    }

    /// `"{page}/{total}"` with a 1-based page number.
    pub fn page_indicator(&self) -> String {
        format!("{}/{}", self.current_page + 1, self.index.total_pages)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn index(&self) -> &PaginationIndex {
        &self.index
    }

    pub fn meta(&self) -> Option<&DocumentMeta> {
        self.meta.as_ref()
    }

    pub fn pending_ticket(&self) -> Option<SegmentTicket> {
        self.pending
    }

    /// Index of the segment currently cached.
    pub fn cached_segment(&self) -> Option<usize> {
        self.cache.current().map(|s| s.segment_index)
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store_with(text: &str, chars_per_page: usize) -> MemoryStore {
        let total_chars = text.chars().count();
        let mut store = MemoryStore::new();
        store.add_document(
            DocumentMeta {
                document_id: "doc".into(),
                title: "Test".into(),
                encoding: "UTF-8".into(),
                byte_len: text.len(),
                total_chars,
                total_pages: total_chars.div_ceil(chars_per_page),
                chars_per_page,
                chapter_count: 0,
            },
            text.as_bytes().to_vec(),
        );
        store
    }

    fn config(segment_size: usize) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.reader.segment_size = segment_size;
        config
    }

    #[test]
    fn test_open_requests_first_segment() {
        let store = store_with("abcdefghij", 2);
        let mut session = ReaderSession::new("doc", "reader", &config(2)).unwrap();
        assert_eq!(session.state(), SessionState::Idle);

        let Navigation::Pending(ticket) = session.open(&store, &store).unwrap() else {
            panic!("expected a segment request");
        };
        assert_eq!(ticket.segment_index, 0);
        assert_eq!(session.state(), SessionState::LoadingSegment);

        let SegmentCompletion::Applied(pages) = session.load_segment(ticket, &store).unwrap() else {
            panic!("expected the segment to apply");
        };
        assert_eq!(session.state(), SessionState::Ready);
        let contents: Vec<_> = pages.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["ab", "cd"]);
        assert_eq!(session.page_indicator(), "1/5");
    }

    #[test]
    fn test_zero_segment_size_rejected() {
        assert!(matches!(
            ReaderSession::new("doc", "reader", &config(0)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_navigate_before_open_is_invalid() {
        let mut session = ReaderSession::new("doc", "reader", &config(2)).unwrap();
        assert!(matches!(
            session.navigate(0, Instant::now()),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_open_twice_is_invalid() {
        let store = store_with("abcd", 2);
        let mut session = ReaderSession::new("doc", "reader", &config(2)).unwrap();
        session.open(&store, &store).unwrap();
        assert!(matches!(
            session.open(&store, &store),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_mismatched_segment_rejected() {
        let store = store_with("abcdefgh", 2);
        let mut session = ReaderSession::new("doc", "reader", &config(2)).unwrap();
        let Navigation::Pending(ticket) = session.open(&store, &store).unwrap() else {
            panic!("expected a segment request");
        };
        let wrong = Segment::from_text("abcdefgh", 1, 2, 2);
        assert!(matches!(
            session.complete_segment(ticket, wrong),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(session.state(), SessionState::LoadingSegment);
    }
}
