//! Pipeline configuration.
//!
//! Every stage owns a small `Default` config struct, and [`PipelineConfig`]
//! bundles them so a whole run (or a CLI invocation via `--config`) can be
//! tuned in one place. The caps here bound worst-case work on large
//! documents and are not optional.

use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for [`EncodingDetector`](crate::EncodingDetector).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct DetectorConfig {
    /// Number of leading bytes scored per candidate encoding.
    pub sample_len: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_len: 64 * 1024,
        }
    }
}

/// Configuration for [`ChapterSegmenter`](crate::ChapterSegmenter).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct SegmenterConfig {
    /// Maximum number of boundaries kept from a single pass.
    pub max_chapters: usize,
    /// Maximum number of paragraphs considered by the chunking fallback.
    pub max_paragraphs: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_chapters: 10_000,
            max_paragraphs: 20_000,
        }
    }
}

/// Configuration for [`ChapterExtractor`](crate::ChapterExtractor).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct ExtractorConfig {
    pub max_title_chars: usize,
    pub max_content_chars: usize,
    /// Chapters shorter than this are treated as segmentation noise.
    pub min_content_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_title_chars: 50,
            max_content_chars: 50_000,
            min_content_chars: 2,
        }
    }
}

/// Configuration for [`Paginator`](crate::Paginator).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct PaginationConfig {
    pub chars_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            chars_per_page: 500,
        }
    }
}

/// Configuration for [`ReaderSession`](crate::ReaderSession).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct ReaderConfig {
    /// Pages per cached segment.
    pub segment_size: usize,
    /// Trailing delay before a progress save is issued.
    pub save_debounce_ms: u64,
}

impl ReaderConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            segment_size: 100,
            save_debounce_ms: 1_000,
        }
    }
}

/// Configuration for [`ingest`](crate::ingest::ingest).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct IngestConfig {
    /// Chapter records per store write.
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { batch_size: 20 }
    }
}

/// Configuration for a full ingestion or reading run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub segmenter: SegmenterConfig,
    pub extractor: ExtractorConfig,
    pub pagination: PaginationConfig,
    pub reader: ReaderConfig,
    pub ingest: IngestConfig,
}

impl PipelineConfig {
    /// Reject values that would make a stage divide by zero or loop forever.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("detector.sample_len", self.detector.sample_len),
            ("segmenter.max_chapters", self.segmenter.max_chapters),
            ("segmenter.max_paragraphs", self.segmenter.max_paragraphs),
            ("extractor.max_title_chars", self.extractor.max_title_chars),
            ("extractor.max_content_chars", self.extractor.max_content_chars),
            ("pagination.chars_per_page", self.pagination.chars_per_page),
            ("reader.segment_size", self.reader.segment_size),
            ("ingest.batch_size", self.ingest.batch_size),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    /// Parse a JSON configuration; missing fields take their defaults.
    #[cfg(feature = "cli")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
