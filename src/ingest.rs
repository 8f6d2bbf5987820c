//! Ingestion: bytes in, chapter records out.

use log::{info, warn};

use crate::config::PipelineConfig;
use crate::document::{DocumentMeta, RawDocument};
use crate::encoding::{DecodedText, EncodingDetector};
use crate::error::{Error, Result};
use crate::extract::{Chapter, ChapterExtractor};
use crate::paginate::PaginationIndex;
use crate::sanitize::sanitize;
use crate::segment::{ChapterSegmenter, Segmentation};
use crate::store::{ChapterRecord, ChapterStore};

/// Everything the pipeline learns about a document before anything is stored.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub decoded: DecodedText,
    /// Sanitized text that chapters and pages are cut from.
    pub text: String,
    pub segmentation: Segmentation,
    pub chapters: Vec<Chapter>,
    pub index: PaginationIndex,
}

/// Decode, sanitize, segment, extract and paginate a document.
///
/// Fails with [`Error::EmptyContent`] when nothing but whitespace survives
/// sanitizing, and with [`Error::UnsupportedFormat`] for non-text documents.
pub fn analyze(raw: &RawDocument, config: &PipelineConfig) -> Result<Analysis> {
    config.validate()?;
    raw.ensure_txt()?;

    let decoded = EncodingDetector::with_config(config.detector.clone()).detect(&raw.bytes);
    let text = sanitize(&decoded.text);
    if text.is_empty() {
        return Err(Error::EmptyContent);
    }

    let segmentation = ChapterSegmenter::with_config(config.segmenter.clone()).segment(&text);
    let chapters =
        ChapterExtractor::with_config(config.extractor.clone()).extract(&text, &segmentation.boundaries);
    let index = PaginationIndex::from_len(text.chars().count(), config.pagination.chars_per_page);

    Ok(Analysis {
        decoded,
        text,
        segmentation,
        chapters,
        index,
    })
}

/// Summary of an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub meta: DocumentMeta,
    /// Winning segmentation strategy.
    pub strategy: &'static str,
    pub written: usize,
    pub failed: usize,
    /// Batches rejected as a whole.
    pub failed_batches: usize,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// True when the document yielded no chapters, so nothing was written.
    pub fn is_empty(&self) -> bool {
        self.meta.chapter_count == 0
    }
}

/// Analyze `raw` and write its chapters to `store`.
///
/// Records are written in batches of `config.ingest.batch_size`, each batch
/// after the previous one returns. Write failures are counted in the report
/// and never stop later batches. Records are inserted as-is; ingesting the
/// same document twice stores its chapters twice.
pub fn ingest<S>(
    raw: &RawDocument,
    document_id: &str,
    title: &str,
    config: &PipelineConfig,
    store: &mut S,
) -> Result<IngestReport>
where
    S: ChapterStore + ?Sized,
{
    let analysis = analyze(raw, config)?;
    let records: Vec<_> = analysis
        .chapters
        .iter()
        .map(|chapter| ChapterRecord::from_chapter(document_id, chapter))
        .collect();
    if records.is_empty() {
        warn!(
            "{document_id} has text but no chapters survived extraction ({} boundaries)",
            analysis.segmentation.boundaries.len()
        );
    }

    let mut written = 0;
    let mut failed = 0;
    let mut failed_batches = 0;
    for (n, batch) in records.chunks(config.ingest.batch_size).enumerate() {
        match store.insert_batch(batch) {
            Ok(results) => {
                for (record, result) in batch.iter().zip(&results) {
                    match result {
                        Ok(()) => written += 1,
                        Err(e) => {
                            warn!("chapter {} of {document_id} not stored: {e}", record.chapter_index);
                            failed += 1;
                        }
                    }
                }
                // Records the store did not report on are not known to be written.
                failed += batch.len().saturating_sub(results.len());
            }
            Err(e) => {
                warn!("batch {n} of {document_id} ({} chapters) failed: {e}", batch.len());
                failed += batch.len();
                failed_batches += 1;
            }
        }
    }

    let meta = DocumentMeta {
        document_id: document_id.to_string(),
        title: title.to_string(),
        encoding: analysis.decoded.encoding_label().to_string(),
        byte_len: raw.len(),
        total_chars: analysis.index.total_chars,
        total_pages: analysis.index.total_pages,
        chars_per_page: analysis.index.chars_per_page,
        chapter_count: records.len(),
    };
    info!(
        "ingested {document_id}: {} chapters via {}, {written} written, {failed} failed",
        records.len(),
        analysis.segmentation.strategy
    );

    Ok(IngestReport {
        meta,
        strategy: analysis.segmentation.strategy,
        written,
        failed,
        failed_batches,
    })
}
