//! Cached regex patterns for heading detection and title cleanup.
//!
//! Uses LazyLock to compile patterns once on first use. All heading
//! patterns are multi-line and anchored at the start of a line, so they
//! expect sanitized text (no leading indentation).

use regex_lite::Regex;
use std::sync::LazyLock;

/// CJK and Arabic numerals used in chapter ordinals.
const NUM: &str = "零〇一二三四五六七八九十百千万两0-9０-９";

/// CJK numerals only.
const CJK_NUM: &str = "零〇一二三四五六七八九十百千两";

/// Han ideographs (basic block and extension A).
const HAN: &str = "㐀-䶿一-鿿";

/// A well-formed, non-empty roman numeral (lowercase; used under `(?i)`).
/// Each alternative starts at a different place value.
const ROMAN: &str = concat!(
    "(?:m{1,3}(?:cm|cd|d?c{0,3})(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})",
    "|(?:cm|cd|dc{0,3}|c{1,3})(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})",
    "|(?:xc|xl|lx{0,3}|x{1,3})(?:ix|iv|v?i{0,3})",
    "|ix|iv|vi{0,3}|i{1,3})",
);

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

// === Heading patterns, in priority order ===

/// 第十二章 / 第3节 / 第五回 / 第一卷 ... with up to 20 chars of the line.
pub static EXPLICIT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?m)^第[{NUM}]+[章节回卷部篇集][^\n]{{0,20}}"))
});

/// 第一卷 第三章 ...
pub static VOLUME_CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?m)^第[{NUM}]+[卷部] ?第[{NUM}]+[章节回][^\n]{{0,20}}"
    ))
});

/// 卷三 ... / 第三卷 ...
pub static STANDALONE_VOLUME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?m)^(?:卷[{NUM}]+|第[{NUM}]+卷)[^\n]{{0,20}}"))
});

/// 第三章：风起 / 章三、风起
pub static MARKER_WITH_SUBTITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?m)^(?:第[{NUM}]+[章节回]|[章节][{NUM}]+) ?[:：、.．·\-—] ?[^\n]{{1,20}}"
    ))
});

/// 12. 风起 / (12) 风起 / 12
pub static NUMERIC_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^[(（]?[0-9０-９]{1,4}(?:[)）.．、:：] ?[^\n]{0,30})?$")
});

/// 十二、风起
pub static CJK_NUMERAL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?m)^[{CJK_NUM}]{{1,6}}[、.．:：] ?[^\n]{{0,30}}$"))
});

/// 12 风起
pub static NUMBER_SHORT_CJK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?m)^[0-9０-９]{{1,4}} ?[{HAN}]{{1,15}}$"))
});

/// Chapter 12 / Volume IV / Part 3: The Storm
pub static LATIN_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?im)^(?:chapter|volume|part|section|book) ?(?:[0-9]+|{ROMAN})(?:[ .:\-][^\n]{{0,40}})?$"
    ))
});

/// Short lines made only of Han characters.
pub static SHORT_CJK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?m)^[{HAN}]{{2,12}}$"))
});

// === Title cleanup ===

/// Leading structural marker of a heading.
pub static LEADING_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^(?:第[{NUM}]+[章节回卷部篇集]|[卷章节][{NUM}]+|(?i:(?:chapter|volume|part|section|book) ?(?:[0-9]+|{ROMAN}))|[{CJK_NUM}]+[、.．:：])"
    ))
});

/// A bare leading number: `12`, `(3)`, `（３）`.
pub static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[(（]?[0-9０-９]+[)）]?"));
