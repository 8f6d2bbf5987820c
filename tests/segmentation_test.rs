//! Chapter segmentation and extraction over realistic layouts.

use txtbook::config::SegmenterConfig;
use txtbook::segment::{FALLBACK_STRATEGY, default_strategies};
use txtbook::{
    BoundaryKind, BoundaryStrategy, Chapter, ChapterBoundary, ChapterExtractor, ChapterSegmenter,
    sanitize,
};

fn chapters_of(raw: &str) -> (&'static str, Vec<Chapter>) {
    let text = sanitize(raw);
    let seg = ChapterSegmenter::new().segment(&text);
    let chapters = ChapterExtractor::new().extract(&text, &seg.boundaries);
    (seg.strategy, chapters)
}

fn titles(chapters: &[Chapter]) -> Vec<&str> {
    chapters.iter().map(|c| c.title.as_str()).collect()
}

// ============================================================================
// Heading styles
// ============================================================================

#[test]
fn test_explicit_markers_with_preface() {
    let raw = "\u{FEFF}书名：风云\r\n作者：佚名\r\n\r\n\u{3000}\u{3000}第一章 少年\r\n\u{3000}\u{3000}山风吹过竹林。\r\n\r\n\u{3000}\u{3000}第二章 出山\r\n\u{3000}\u{3000}他走下了山。\r\n";
    let (strategy, chapters) = chapters_of(raw);
    assert_eq!(strategy, "explicit_marker");
    assert_eq!(titles(&chapters), ["少年", "出山"]);
    assert_eq!(chapters[0].content, "山风吹过竹林。");
    assert_eq!(chapters[1].content, "他走下了山。");
}

#[test]
fn test_volume_and_chapter_headings() {
    let raw = "第一卷 第一章 初见\n正文一\n第一卷 第二章 再见\n正文二";
    let (strategy, chapters) = chapters_of(raw);
    // Each line also starts with an explicit marker, which has priority.
    assert_eq!(strategy, "explicit_marker");
    assert_eq!(titles(&chapters), ["初见", "再见"]);
}

#[test]
fn test_numeric_prefixes() {
    let raw = "1. 开端\n故事从这里开始。\n2. 发展\n事情越来越复杂。\n3. 结局\n终于结束了。";
    let (strategy, chapters) = chapters_of(raw);
    assert_eq!(strategy, "numeric_prefix");
    assert_eq!(titles(&chapters), ["开端", "发展", "结局"]);
}

#[test]
fn test_cjk_numeral_prefixes() {
    let raw = "一、缘起\n很久以前。\n二、缘灭\n后来的事。";
    let (strategy, chapters) = chapters_of(raw);
    assert_eq!(strategy, "cjk_numeral_prefix");
    assert_eq!(titles(&chapters), ["缘起", "缘灭"]);
}

#[test]
fn test_latin_headings() {
    let raw = "CHAPTER I\nIt was the best of times.\n\nCHAPTER II\nIt was the worst of times.";
    let (strategy, chapters) = chapters_of(raw);
    assert_eq!(strategy, "latin_marker");
    assert_eq!(titles(&chapters), ["Chapter 1", "Chapter 2"]);
    assert_eq!(chapters[1].content, "It was the worst of times.");
}

#[test]
fn test_short_cjk_lines() {
    let raw = "楔子\n很久很久以前，山里住着一位老人。\n归来\n多年以后，少年回到了山里，老人已经不在了。";
    let (strategy, chapters) = chapters_of(raw);
    assert_eq!(strategy, "short_cjk_line");
    assert_eq!(titles(&chapters), ["楔子", "归来"]);
}

#[test]
fn test_idioms_are_not_headings() {
    let raw = "第一回合他就输了，心里很不服气，决定再来一次，这一次他要赢回来。";
    let (strategy, chapters) = chapters_of(raw);
    assert_eq!(strategy, FALLBACK_STRATEGY);
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].title, "Chapter 1");
}

// ============================================================================
// Fallback and caps
// ============================================================================

#[test]
fn test_chunk_sizes_grow_with_length() {
    let lines: Vec<String> = (0..120)
        .map(|i| format!("Line {i} of a long letter with no headings at all."))
        .collect();
    let text = sanitize(&lines.join("\n"));
    let seg = ChapterSegmenter::new().segment(&text);
    assert!(seg.is_fallback());
    // 120 paragraphs fall in the 51..=200 tier: groups of 10.
    assert_eq!(seg.boundaries.len(), 12);
    assert!(seg.boundaries.iter().all(|b| b.kind == BoundaryKind::Chunk));
}

#[test]
fn test_paragraph_cap_limits_fallback_work() {
    let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
    let text = lines.join("\n");
    let config = SegmenterConfig {
        max_paragraphs: 10,
        ..Default::default()
    };
    let seg = ChapterSegmenter::with_config(config).segment(&text);
    assert_eq!(seg.boundaries.len(), 2);

    // The last chunk runs to the end of the text.
    let chapters = ChapterExtractor::new().extract(&text, &seg.boundaries);
    assert!(chapters[1].content.ends_with("line 99"));
}

// ============================================================================
// Custom strategies
// ============================================================================

/// Headings written as `## Title`.
struct MarkdownHeadings;

impl BoundaryStrategy for MarkdownHeadings {
    fn name(&self) -> &'static str {
        "markdown_heading"
    }

    fn attempt(&self, text: &str) -> Vec<ChapterBoundary> {
        let mut found = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            if line.starts_with("## ") {
                found.push(ChapterBoundary::heading(offset, line));
            }
            offset += line.len() + 1;
        }
        found
    }
}

#[test]
fn test_custom_strategy_runs_first() {
    let mut strategies: Vec<Box<dyn BoundaryStrategy>> = vec![Box::new(MarkdownHeadings)];
    strategies.extend(default_strategies());
    let segmenter = ChapterSegmenter::with_strategies(strategies, SegmenterConfig::default());

    let text = "## Arrival\n第一章 不是这个\n## Departure\nThe end.";
    let seg = segmenter.segment(text);
    assert_eq!(seg.strategy, "markdown_heading");
    assert_eq!(seg.boundaries.len(), 2);
    assert_eq!(
        segmenter.strategy_names().take(2).collect::<Vec<_>>(),
        ["markdown_heading", "explicit_marker"]
    );
}
