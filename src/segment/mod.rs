//! Chapter boundary detection.
//!
//! A [`ChapterSegmenter`] holds an ordered list of [`BoundaryStrategy`]
//! objects. Each strategy proposes candidate headings; candidates are
//! filtered with [`is_plausible_heading`], and the first strategy with at
//! least one survivor wins outright. Documents where nothing matches are cut
//! into fixed-size groups of paragraphs instead.

mod fallback;
pub(crate) mod patterns;
mod strategy;

pub use fallback::{FALLBACK_STRATEGY, chunk_size, paragraph_starts};
pub use strategy::{BoundaryStrategy, PatternStrategy, default_strategies};

use std::fmt;

use log::{debug, info};

use crate::config::SegmenterConfig;
use crate::encoding::is_punctuation;

/// Substrings that reuse a marker character (回, 节, 章) outside a heading.
pub const FALSE_POSITIVES: &[&str] = &[
    "回合", "回来", "回去", "回头", "回答", "回忆", "回事", "回应", "回复", "回过神",
    "节课", "节日", "节目", "章程",
];

/// Headings with more punctuation than this share of their characters are rejected.
const MAX_PUNCT_DENSITY: f64 = 0.3;

/// How a boundary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// A heading line matched by a strategy; the heading itself is not content.
    Heading,
    /// The start of a paragraph group from the chunking fallback.
    Chunk,
}

/// Where a chapter starts in the sanitized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterBoundary {
    /// Byte offset into the text.
    pub offset: usize,
    /// The matched heading text (empty for chunks).
    pub text: String,
    pub kind: BoundaryKind,
}

impl ChapterBoundary {
    pub fn heading(offset: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
            kind: BoundaryKind::Heading,
        }
    }

    pub fn chunk(offset: usize) -> Self {
        Self {
            offset,
            text: String::new(),
            kind: BoundaryKind::Chunk,
        }
    }

    /// Byte offset just past the matched text.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Result of a segmentation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Boundaries in strictly increasing offset order.
    pub boundaries: Vec<ChapterBoundary>,
    /// Name of the winning strategy, or [`FALLBACK_STRATEGY`].
    pub strategy: &'static str,
}

impl Segmentation {
    /// True when no heading strategy matched and paragraphs were chunked.
    pub fn is_fallback(&self) -> bool {
        self.strategy == FALLBACK_STRATEGY
    }
}

/// Splits sanitized text into chapter boundaries.
pub struct ChapterSegmenter {
    strategies: Vec<Box<dyn BoundaryStrategy>>,
    config: SegmenterConfig,
}

impl Default for ChapterSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChapterSegmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChapterSegmenter")
            .field("strategies", &self.strategy_names().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl ChapterSegmenter {
    /// Segmenter with the built-in strategies and default caps.
    pub fn new() -> Self {
        Self::with_config(SegmenterConfig::default())
    }

    pub fn with_config(config: SegmenterConfig) -> Self {
        Self::with_strategies(default_strategies(), config)
    }

    /// Segmenter with a custom strategy list, tried in the given order.
    pub fn with_strategies(strategies: Vec<Box<dyn BoundaryStrategy>>, config: SegmenterConfig) -> Self {
        Self { strategies, config }
    }

    pub fn strategy_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|s| s.name())
    }

    /// Find chapter boundaries in `text`.
    ///
    /// Never fails; unstructured text falls back to paragraph chunks, and
    /// empty text yields no boundaries.
    pub fn segment(&self, text: &str) -> Segmentation {
        for strategy in &self.strategies {
            let candidates = strategy.attempt(text);
            let found = candidates.len();
            let mut boundaries: Vec<_> = candidates
                .into_iter()
                .filter(|b| is_plausible_heading(&b.text))
                .collect();
            debug!(
                "strategy {}: {} candidates, {} kept",
                strategy.name(),
                found,
                boundaries.len()
            );
            if boundaries.is_empty() {
                continue;
            }

            order_boundaries(&mut boundaries);
            self.cap(&mut boundaries);
            info!(
                "segmented into {} chapters with {}",
                boundaries.len(),
                strategy.name()
            );
            return Segmentation {
                boundaries,
                strategy: strategy.name(),
            };
        }

        let mut boundaries = fallback::chunk_boundaries(text, self.config.max_paragraphs);
        self.cap(&mut boundaries);
        info!(
            "no heading structure found; chunked into {} parts",
            boundaries.len()
        );
        Segmentation {
            boundaries,
            strategy: FALLBACK_STRATEGY,
        }
    }

    fn cap(&self, boundaries: &mut Vec<ChapterBoundary>) {
        if boundaries.len() > self.config.max_chapters {
            debug!(
                "truncating {} boundaries to {}",
                boundaries.len(),
                self.config.max_chapters
            );
            boundaries.truncate(self.config.max_chapters);
        }
    }
}

/// Heuristic filter applied to every strategy's candidates.
pub fn is_plausible_heading(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if FALSE_POSITIVES.iter().any(|fp| text.contains(fp)) {
        return false;
    }

    let chars = text.chars().count();
    if chars < 2 {
        return false;
    }
    if chars > 3 && text.chars().all(|c| c.is_ascii_digit() || ('０'..='９').contains(&c)) {
        return false;
    }

    let punct = text.chars().filter(|&c| is_punctuation(c)).count();
    punct as f64 / chars as f64 <= MAX_PUNCT_DENSITY
}

/// Sort by offset and drop candidates that start inside an earlier one.
fn order_boundaries(boundaries: &mut Vec<ChapterBoundary>) {
    boundaries.sort_by_key(|b| b.offset);
    let mut last_end = None;
    boundaries.retain(|b| {
        let keep = last_end.is_none_or(|end| b.offset >= end);
        if keep {
            last_end = Some(b.end().max(b.offset + 1));
        }
        keep
    });
}

/// Lines of `text` with their starting byte offsets.
pub(crate) fn line_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = text.as_bytes();
    memchr::memchr_iter(b'\n', bytes)
        .chain(std::iter::once(bytes.len()))
        .scan(0usize, move |start, end| {
            let line = (*start, &text[*start..end]);
            *start = end + 1;
            Some(line)
        })
}

/// Byte offset of the end of the line containing `offset` (the `\n` or end of text).
pub(crate) fn line_end(text: &str, offset: usize) -> usize {
    memchr::memchr(b'\n', &text.as_bytes()[offset..])
        .map(|i| offset + i)
        .unwrap_or(text.len())
}
