//! # txtbook
//!
//! Turns plain-text novels of unknown encoding into chapters and pages.
//!
//! ## Features
//!
//! - Detect the byte encoding of a buffer (UTF-8, UTF-16, GBK, Big5, Shift_JIS,
//!   EUC-JP, EUC-KR) from its BOM or by scoring candidate decodes
//! - Split the text into titled chapters using a cascade of heading
//!   heuristics, falling back to paragraph chunks for unstructured text
//! - Paginate by character count and read incrementally through a
//!   [`ReaderSession`] that caches one segment of pages at a time and
//!   saves reading progress with a debounce
//!
//! ## Quick Start
//!
//! ```
//! use txtbook::{ChapterExtractor, ChapterSegmenter, EncodingDetector, sanitize};
//!
//! let bytes = "第一章 风起\n内容...\n第二章 云涌\n更多内容".as_bytes();
//! let decoded = EncodingDetector::new().detect(bytes);
//! let text = sanitize(&decoded.text);
//!
//! let segmentation = ChapterSegmenter::new().segment(&text);
//! let chapters = ChapterExtractor::new().extract(&text, &segmentation.boundaries);
//!
//! assert_eq!(chapters[0].title, "风起");
//! assert_eq!(chapters[1].content, "更多内容");
//! ```
//!
//! ## Ingesting and Reading
//!
//! Storage is abstracted behind [`DocumentStore`], [`ChapterStore`] and
//! [`ProgressStore`]. [`MemoryStore`] implements all three:
//!
//! ```
//! use std::time::Instant;
//! use txtbook::{
//!     MemoryStore, Navigation, PipelineConfig, RawDocument, ReaderSession, ingest,
//! };
//!
//! let config = PipelineConfig::default();
//! let raw = RawDocument::txt("第一章 风起\n内容...\n第二章 云涌\n更多内容");
//! let mut store = MemoryStore::new();
//!
//! let report = ingest(&raw, "doc-1", "风云", &config, &mut store).unwrap();
//! store.add_document(report.meta, raw.bytes);
//!
//! let mut session = ReaderSession::new("doc-1", "reader-1", &config).unwrap();
//! if let Navigation::Pending(ticket) = session.open(&store, &store).unwrap() {
//!     session.load_segment(ticket, &store).unwrap();
//! }
//! assert_eq!(session.page_indicator(), "1/1");
//! session.flush(&mut store);
//! ```

pub mod config;
pub mod document;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod paginate;
pub mod reader;
pub mod sanitize;
pub mod segment;
pub mod store;
pub(crate) mod util;

pub use config::{
    DetectorConfig, ExtractorConfig, IngestConfig, PaginationConfig, PipelineConfig, ReaderConfig,
    SegmenterConfig,
};
pub use document::{DocumentMeta, Format, RawDocument};
pub use encoding::{DecodedText, DetectionMethod, EncodingDetector};
pub use error::{Error, Result};
pub use extract::{Chapter, ChapterExtractor};
pub use ingest::{Analysis, IngestReport, analyze, ingest};
pub use paginate::{PaginationIndex, Paginator};
pub use reader::{
    Navigation, Page, ReaderSession, ReadingProgress, Segment, SegmentCache, SegmentCompletion,
    SegmentTicket, SessionState,
};
pub use sanitize::sanitize;
pub use segment::{BoundaryKind, BoundaryStrategy, ChapterBoundary, ChapterSegmenter, Segmentation};
pub use store::{ChapterRecord, ChapterStore, DocumentStore, MemoryStore, ProgressId, ProgressStore};
