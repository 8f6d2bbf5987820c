//! Storage seams.
//!
//! The pipeline never touches a database directly. Documents, chapters and
//! reading progress live behind the traits here, and [`MemoryStore`] is the
//! in-process implementation used by tests and the CLI.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use crate::document::DocumentMeta;
use crate::error::{Error, Result};
use crate::extract::Chapter;
use crate::reader::ReadingProgress;

/// Read access to uploaded documents.
pub trait DocumentStore {
    fn metadata(&self, document_id: &str) -> Result<DocumentMeta>;

    /// The original uploaded bytes.
    fn fetch(&self, document_id: &str) -> Result<Vec<u8>>;
}

/// A chapter as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct ChapterRecord {
    pub document_id: String,
    pub chapter_index: usize,
    pub title: String,
    pub content: String,
    pub link: String,
}

impl ChapterRecord {
    pub fn from_chapter(document_id: &str, chapter: &Chapter) -> Self {
        Self {
            document_id: document_id.to_string(),
            chapter_index: chapter.index,
            title: chapter.title.clone(),
            content: chapter.content.clone(),
            link: chapter.link.clone(),
        }
    }
}

/// Batched chapter writes.
pub trait ChapterStore {
    /// Insert a batch of records.
    ///
    /// An outer error fails the whole batch. Otherwise the result holds one
    /// entry per record, in input order.
    fn insert_batch(&mut self, records: &[ChapterRecord]) -> Result<Vec<Result<()>>>;
}

/// Identifier of a stored progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgressId(pub u64);

/// Reading-progress persistence, keyed by (document, reader).
pub trait ProgressStore {
    fn find(&self, document_id: &str, reader_id: &str) -> Result<Option<(ProgressId, ReadingProgress)>>;

    fn create(&mut self, progress: &ReadingProgress) -> Result<ProgressId>;

    /// Fails with [`Error::NotFound`] if `id` no longer exists.
    fn update(&mut self, id: ProgressId, progress: &ReadingProgress) -> Result<()>;
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, (DocumentMeta, Vec<u8>)>,
    chapters: Vec<ChapterRecord>,
    progress: BTreeMap<ProgressId, ReadingProgress>,
    next_progress_id: u64,
    fetches: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document so sessions can open it.
    pub fn add_document(&mut self, meta: DocumentMeta, bytes: Vec<u8>) {
        self.documents.insert(meta.document_id.clone(), (meta, bytes));
    }

    pub fn chapters(&self) -> &[ChapterRecord] {
        &self.chapters
    }

    /// Chapters of one document, in index order.
    pub fn chapters_for(&self, document_id: &str) -> Vec<&ChapterRecord> {
        let mut records: Vec<_> = self
            .chapters
            .iter()
            .filter(|r| r.document_id == document_id)
            .collect();
        records.sort_by_key(|r| r.chapter_index);
        records
    }

    pub fn progress_for(&self, document_id: &str, reader_id: &str) -> Option<&ReadingProgress> {
        self.progress
            .values()
            .find(|p| p.document_id == document_id && p.reader_id == reader_id)
    }

    pub fn progress_count(&self) -> usize {
        self.progress.len()
    }

    pub fn remove_progress(&mut self, id: ProgressId) -> Option<ReadingProgress> {
        self.progress.remove(&id)
    }

    /// Number of [`DocumentStore::fetch`] calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl DocumentStore for MemoryStore {
    fn metadata(&self, document_id: &str) -> Result<DocumentMeta> {
        self.documents
            .get(document_id)
            .map(|(meta, _)| meta.clone())
            .ok_or_else(|| Error::NotFound(format!("document {document_id}")))
    }

    fn fetch(&self, document_id: &str) -> Result<Vec<u8>> {
        self.fetches.set(self.fetches.get() + 1);
        self.documents
            .get(document_id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::Fetch(format!("document {document_id} has no content")))
    }
}

impl ChapterStore for MemoryStore {
    fn insert_batch(&mut self, records: &[ChapterRecord]) -> Result<Vec<Result<()>>> {
        self.chapters.extend_from_slice(records);
        Ok(records.iter().map(|_| Ok(())).collect())
    }
}

impl ProgressStore for MemoryStore {
    fn find(&self, document_id: &str, reader_id: &str) -> Result<Option<(ProgressId, ReadingProgress)>> {
        Ok(self
            .progress
            .iter()
            .find(|(_, p)| p.document_id == document_id && p.reader_id == reader_id)
            .map(|(id, p)| (*id, p.clone())))
    }

    fn create(&mut self, progress: &ReadingProgress) -> Result<ProgressId> {
        self.next_progress_id += 1;
        let id = ProgressId(self.next_progress_id);
        self.progress.insert(id, progress.clone());
        Ok(id)
    }

    fn update(&mut self, id: ProgressId, progress: &ReadingProgress) -> Result<()> {
        match self.progress.get_mut(&id) {
            Some(slot) => {
                *slot = progress.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("progress record {}", id.0))),
        }
    }
}
