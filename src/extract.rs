//! Turning boundaries into titled chapters.

use std::ops::Range;

use log::debug;

use crate::config::ExtractorConfig;
use crate::segment::patterns::{LEADING_MARKER_RE, LEADING_NUMBER_RE};
use crate::segment::{BoundaryKind, ChapterBoundary, line_end};
use crate::util::truncate_chars;

/// Appended to content cut at `max_content_chars`.
pub const CONTENT_ELLIPSIS: &str = "\n[...]";

/// Appended to titles cut at `max_title_chars`.
pub const TITLE_ELLIPSIS: &str = "...";

/// A titled section of the sanitized text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Chapter {
    /// Ordinal of the boundary this chapter came from. Dropped chapters leave gaps.
    pub index: usize,
    pub title: String,
    pub content: String,
    /// Stable anchor, `chapter_{index}`.
    pub link: String,
    /// Byte range of the whole section (heading included) in the sanitized text.
    pub span: Range<usize>,
}

/// Anchor used to link to a chapter.
pub fn chapter_link(index: usize) -> String {
    format!("chapter_{index}")
}

/// Builds [`Chapter`]s from sanitized text and its boundaries.
#[derive(Debug, Clone, Default)]
pub struct ChapterExtractor {
    config: ExtractorConfig,
}

impl ChapterExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract one chapter per boundary.
    ///
    /// Each chapter runs from its boundary to the next one (or the end of
    /// the text). Heading chapters whose body is shorter than
    /// `min_content_chars` are dropped; chunks are always kept.
    pub fn extract(&self, text: &str, boundaries: &[ChapterBoundary]) -> Vec<Chapter> {
        let mut chapters = Vec::with_capacity(boundaries.len());

        for (i, boundary) in boundaries.iter().enumerate() {
            let end = boundaries.get(i + 1).map_or(text.len(), |next| next.offset);
            let span = boundary.offset..end;

            let (title, body_start) = match boundary.kind {
                BoundaryKind::Heading => {
                    let heading_end = line_end(text, boundary.offset).min(end);
                    let line = &text[boundary.offset..heading_end];
                    // Custom strategies may report text that is not a prefix of the line.
                    let raw = match line.strip_prefix(boundary.text.as_str()) {
                        Some(rest) if has_script(rest) => line,
                        _ => boundary.text.as_str(),
                    };
                    (clean_title(raw), (heading_end + 1).min(end))
                }
                BoundaryKind::Chunk => (String::new(), boundary.offset),
            };

            let title = if title.is_empty() {
                format!("Chapter {}", i + 1)
            } else {
                self.cap_title(title)
            };

            let body = text[body_start..end].trim();
            let content = match boundary.kind {
                BoundaryKind::Heading => {
                    let content = drop_repeated_heading(body, &title);
                    if content.chars().count() < self.config.min_content_chars {
                        debug!("dropping chapter {i} ({title}): content too short");
                        continue;
                    }
                    content
                }
                BoundaryKind::Chunk => body,
            };

            chapters.push(Chapter {
                index: i,
                title,
                content: self.cap_content(content),
                link: chapter_link(i),
                span,
            });
        }

        debug!(
            "extracted {} chapters from {} boundaries",
            chapters.len(),
            boundaries.len()
        );
        chapters
    }

    fn cap_title(&self, title: String) -> String {
        let max = self.config.max_title_chars;
        if title.chars().count() <= max {
            return title;
        }
        format!("{}{TITLE_ELLIPSIS}", truncate_chars(&title, max))
    }

    fn cap_content(&self, content: &str) -> String {
        let max = self.config.max_content_chars;
        let truncated = truncate_chars(content, max);
        if truncated.len() == content.len() {
            content.to_string()
        } else {
            format!("{truncated}{CONTENT_ELLIPSIS}")
        }
    }
}

/// Strip ordinals, structural markers and separators from a heading.
///
/// `第一卷 第三章：风起` becomes `风起`. Returns an empty string when the
/// heading is nothing but markers. A bare number is an ordinal only at the
/// very start, so `第十章 1949年的春天` keeps its year.
pub fn clean_title(raw: &str) -> String {
    let mut rest = raw.trim();
    if let Some(m) = LEADING_NUMBER_RE.find(rest) {
        rest = rest[m.end()..].trim_start_matches(is_separator);
    }
    loop {
        let stripped = strip_marker(rest).trim_start_matches(is_separator);
        if stripped.len() == rest.len() {
            break;
        }
        rest = stripped;
    }
    rest.trim_end_matches(is_separator).to_string()
}

fn strip_marker(s: &str) -> &str {
    let Some(m) = LEADING_MARKER_RE.find(s) else {
        return s;
    };
    let rest = &s[m.end()..];
    // A roman numeral that is really the start of a word ("Part dimension").
    if m.as_str().ends_with(|c: char| c.is_ascii_alphabetic())
        && rest.starts_with(|c: char| c.is_ascii_alphanumeric())
    {
        return s;
    }
    rest
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ':' | '：' | '、' | '.' | '．' | '·' | '-' | '—' | '_' | ',' | '，' | '|' | '/'
        )
}

fn has_script(s: &str) -> bool {
    s.chars().any(char::is_alphanumeric)
}

/// Drop the first line when it only repeats the title.
fn drop_repeated_heading<'a>(content: &'a str, title: &str) -> &'a str {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    let first = first.trim();
    if !first.is_empty() && (first == title || title.contains(first)) {
        rest.trim()
    } else {
        content
    }
}
