//! End-to-end ingestion tests: bytes on disk to stored chapter records.

use std::io::Write;

use encoding_rs::GBK;
use txtbook::{
    ChapterRecord, ChapterStore, Error, MemoryStore, PipelineConfig, RawDocument, Result, ingest,
};

fn numbered_chapters(count: usize) -> String {
    (1..=count)
        .map(|i| format!("第{i}章 标题{i}\n这是第{i}章的正文。"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Records every batch it receives and fails the records or batches it is told to.
#[derive(Default)]
struct RecordingStore {
    batches: Vec<Vec<usize>>,
    failing_batch: Option<usize>,
    failing_chapter: Option<usize>,
}

impl ChapterStore for RecordingStore {
    fn insert_batch(&mut self, records: &[ChapterRecord]) -> Result<Vec<Result<()>>> {
        let n = self.batches.len();
        self.batches
            .push(records.iter().map(|r| r.chapter_index).collect());
        if self.failing_batch == Some(n) {
            return Err(Error::Persistence("write timeout".into()));
        }
        Ok(records
            .iter()
            .map(|r| {
                if self.failing_chapter == Some(r.chapter_index) {
                    Err(Error::Persistence("duplicate key".into()))
                } else {
                    Ok(())
                }
            })
            .collect())
    }
}

// ============================================================================
// Batching
// ============================================================================

#[test]
fn test_chapters_written_in_batches_of_twenty() {
    let raw = RawDocument::txt(numbered_chapters(45));
    let mut store = RecordingStore::default();
    let report = ingest(&raw, "doc", "Test", &PipelineConfig::default(), &mut store).unwrap();

    let sizes: Vec<_> = store.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, [20, 20, 5]);
    assert_eq!(store.batches[1][0], 20);
    assert_eq!(report.written, 45);
    assert_eq!(report.failed, 0);
    assert!(report.is_complete());
    assert!(!report.is_empty());
}

#[test]
fn test_custom_batch_size() {
    let mut config = PipelineConfig::default();
    config.ingest.batch_size = 7;
    let raw = RawDocument::txt(numbered_chapters(15));
    let mut store = RecordingStore::default();
    ingest(&raw, "doc", "Test", &config, &mut store).unwrap();

    let sizes: Vec<_> = store.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, [7, 7, 1]);
}

#[test]
fn test_single_record_failure_is_counted() {
    let raw = RawDocument::txt(numbered_chapters(30));
    let mut store = RecordingStore {
        failing_chapter: Some(12),
        ..Default::default()
    };
    let report = ingest(&raw, "doc", "Test", &PipelineConfig::default(), &mut store).unwrap();

    assert_eq!(report.written, 29);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failed_batches, 0);
    assert!(!report.is_complete());
}

#[test]
fn test_failed_batch_does_not_stop_later_batches() {
    let raw = RawDocument::txt(numbered_chapters(50));
    let mut store = RecordingStore {
        failing_batch: Some(1),
        ..Default::default()
    };
    let report = ingest(&raw, "doc", "Test", &PipelineConfig::default(), &mut store).unwrap();

    assert_eq!(store.batches.len(), 3);
    assert_eq!(report.failed, 20);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.written, 30);
}

// ============================================================================
// Content
// ============================================================================

#[test]
fn test_records_keep_index_and_link() {
    let raw = RawDocument::txt("第一章 风起\n内容...\n第二章 云涌\n更多内容");
    let mut store = MemoryStore::new();
    ingest(&raw, "doc", "风云", &PipelineConfig::default(), &mut store).unwrap();

    let chapters = store.chapters_for("doc");
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].title, "风起");
    assert_eq!(chapters[0].link, "chapter_0");
    assert_eq!(chapters[1].chapter_index, 1);
    assert_eq!(chapters[1].content, "更多内容");
}

#[test]
fn test_empty_content_writes_nothing() {
    let raw = RawDocument::txt("\u{FEFF} \r\n \t \r\n");
    let mut store = MemoryStore::new();
    let result = ingest(&raw, "doc", "Empty", &PipelineConfig::default(), &mut store);
    assert!(matches!(result, Err(Error::EmptyContent)));
    assert!(store.chapters().is_empty());
}

#[test]
fn test_heading_without_body_reports_empty() {
    let raw = RawDocument::txt("第一章 风起");
    let mut store = MemoryStore::new();
    let report = ingest(&raw, "doc", "Short", &PipelineConfig::default(), &mut store).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.written, 0);
    assert!(store.chapters().is_empty());
}

#[test]
fn test_unstructured_text_yields_chunks() {
    let text: Vec<String> = (0..23)
        .map(|i| format!("Paragraph {i} goes on about nothing in particular."))
        .collect();
    let raw = RawDocument::txt(text.join("\n\n"));
    let mut store = MemoryStore::new();
    let report = ingest(&raw, "doc", "Essay", &PipelineConfig::default(), &mut store).unwrap();

    assert_eq!(report.strategy, "paragraph_chunks");
    // 23 paragraphs in groups of five.
    assert_eq!(store.chapters().len(), 5);
    assert_eq!(store.chapters()[0].title, "Chapter 1");
    assert!(store.chapters()[4].content.starts_with("Paragraph 20"));
}

#[test]
fn test_reingest_inserts_again() {
    let raw = RawDocument::txt(numbered_chapters(3));
    let mut store = MemoryStore::new();
    let config = PipelineConfig::default();
    ingest(&raw, "doc", "Test", &config, &mut store).unwrap();
    ingest(&raw, "doc", "Test", &config, &mut store).unwrap();
    assert_eq!(store.chapters().len(), 6);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = PipelineConfig::default();
    config.ingest.batch_size = 0;
    let raw = RawDocument::txt(numbered_chapters(3));
    let mut store = MemoryStore::new();
    assert!(matches!(
        ingest(&raw, "doc", "Test", &config, &mut store),
        Err(Error::Config(_))
    ));
}

// ============================================================================
// Files on disk
// ============================================================================

#[test]
fn test_gbk_file_on_disk() {
    let text = "第一章 初入江湖\r\n少年背着剑走出山门，回头望了一眼。\r\n\r\n第二章 风雨欲来\r\n城中的客栈里，人们都在谈论那场比武。\r\n";
    let (bytes, _, unmappable) = GBK.encode(text);
    assert!(!unmappable);

    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(&bytes).unwrap();

    let raw = RawDocument::open(file.path()).unwrap();
    let mut store = MemoryStore::new();
    let report = ingest(&raw, "gbk", "江湖", &PipelineConfig::default(), &mut store).unwrap();

    assert_eq!(report.meta.encoding, "GBK");
    assert_eq!(report.meta.byte_len, bytes.len());
    let titles: Vec<_> = store.chapters().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["初入江湖", "风雨欲来"]);
}

#[test]
fn test_ingested_document_can_be_read() {
    let text = numbered_chapters(200);
    let raw = RawDocument::txt(text);
    let mut store = MemoryStore::new();
    let config = PipelineConfig::default();
    let report = ingest(&raw, "doc", "Long", &config, &mut store).unwrap();
    assert!(report.meta.total_pages > 1);
    store.add_document(report.meta.clone(), raw.bytes.clone());

    let mut session = txtbook::ReaderSession::new("doc", "reader", &config).unwrap();
    let txtbook::Navigation::Pending(ticket) = session.open(&store, &store).unwrap() else {
        panic!("Expected a segment request");
    };
    session.load_segment(ticket, &store).unwrap();
    let window = session.window().unwrap();
    assert!(window[0].content.starts_with("第1章 标题1"));
    assert_eq!(
        session.page_indicator(),
        format!("1/{}", report.meta.total_pages)
    );
}
