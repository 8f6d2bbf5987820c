//! Boundary detection strategies.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::ChapterBoundary;
use super::patterns::{
    CJK_NUMERAL_PREFIX_RE, EXPLICIT_MARKER_RE, LATIN_MARKER_RE, MARKER_WITH_SUBTITLE_RE,
    NUMBER_SHORT_CJK_RE, NUMERIC_PREFIX_RE, SHORT_CJK_LINE_RE, STANDALONE_VOLUME_RE,
    VOLUME_CHAPTER_RE,
};

/// One independent way of finding chapter headings.
///
/// Strategies return raw candidates; filtering, ordering and the choice
/// between strategies belong to [`ChapterSegmenter`](super::ChapterSegmenter).
pub trait BoundaryStrategy: Send + Sync {
    /// Stable identifier, reported in [`Segmentation`](super::Segmentation).
    fn name(&self) -> &'static str;

    /// Every candidate heading in `text`.
    fn attempt(&self, text: &str) -> Vec<ChapterBoundary>;
}

/// A strategy backed by a single multi-line regex.
pub struct PatternStrategy {
    name: &'static str,
    pattern: &'static LazyLock<Regex>,
}

impl PatternStrategy {
    pub const fn new(name: &'static str, pattern: &'static LazyLock<Regex>) -> Self {
        Self { name, pattern }
    }
}

impl BoundaryStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, text: &str) -> Vec<ChapterBoundary> {
        self.pattern
            .find_iter(text)
            .map(|m| ChapterBoundary::heading(m.start(), m.as_str().trim_end()))
            .collect()
    }
}

/// The built-in strategies in priority order.
pub fn default_strategies() -> Vec<Box<dyn BoundaryStrategy>> {
    vec![
        Box::new(PatternStrategy::new("explicit_marker", &EXPLICIT_MARKER_RE)),
        Box::new(PatternStrategy::new("volume_chapter", &VOLUME_CHAPTER_RE)),
        Box::new(PatternStrategy::new("standalone_volume", &STANDALONE_VOLUME_RE)),
        Box::new(PatternStrategy::new("marker_with_subtitle", &MARKER_WITH_SUBTITLE_RE)),
        Box::new(PatternStrategy::new("numeric_prefix", &NUMERIC_PREFIX_RE)),
        Box::new(PatternStrategy::new("cjk_numeral_prefix", &CJK_NUMERAL_PREFIX_RE)),
        Box::new(PatternStrategy::new("number_short_cjk", &NUMBER_SHORT_CJK_RE)),
        Box::new(PatternStrategy::new("latin_marker", &LATIN_MARKER_RE)),
        Box::new(PatternStrategy::new("short_cjk_line", &SHORT_CJK_LINE_RE)),
    ]
}
