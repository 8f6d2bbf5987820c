//! Encoding detection tests over whole documents.

use encoding_rs::{GBK, UTF_8, UTF_16BE, UTF_16LE};
use proptest::prelude::*;

use txtbook::{DetectionMethod, DetectorConfig, EncodingDetector, sanitize};

fn with_bom(bom: &[u8], body: &[u8]) -> Vec<u8> {
    let mut bytes = bom.to_vec();
    bytes.extend_from_slice(body);
    bytes
}

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

// ============================================================================
// Byte-order marks
// ============================================================================

#[test]
fn test_utf16le_bom_document_with_crlf() {
    let text = "\u{3000}\u{3000}第一章 风起\r\n少年出山。\r\n";
    let decoded = EncodingDetector::new().detect(&with_bom(&[0xFF, 0xFE], &utf16le(text)));

    assert_eq!(decoded.method, DetectionMethod::Bom);
    assert_eq!(decoded.encoding, UTF_16LE);
    assert_eq!(sanitize(&decoded.text), "第一章 风起\n少年出山。");
}

#[test]
fn test_bom_wins_over_scoring() {
    // ASCII after a UTF-16BE BOM would score better as UTF-8, but the BOM decides.
    let decoded = EncodingDetector::new().detect(&with_bom(&[0xFE, 0xFF], &utf16be("plain")));
    assert_eq!(decoded.method, DetectionMethod::Bom);
    assert_eq!(decoded.encoding, UTF_16BE);
    assert_eq!(decoded.text, "plain");
}

#[test]
fn test_malformed_bom_body_falls_back_to_scoring() {
    // A UTF-8 BOM followed by GBK bytes.
    let (gbk, _, _) = GBK.encode("天地之间，有一股神秘的力量正在苏醒。");
    let decoded = EncodingDetector::new().detect(&with_bom(&[0xEF, 0xBB, 0xBF], &gbk));
    assert_ne!(decoded.method, DetectionMethod::Bom);
}

proptest! {
    #[test]
    fn prop_utf8_bom_is_authoritative(text in "(?s).{0,100}") {
        let decoded = EncodingDetector::new().detect(&with_bom(&[0xEF, 0xBB, 0xBF], text.as_bytes()));
        prop_assert_eq!(decoded.method, DetectionMethod::Bom);
        prop_assert_eq!(decoded.encoding, UTF_8);
        prop_assert_eq!(decoded.text, text);
    }

    #[test]
    fn prop_utf16le_bom_is_authoritative(text in "(?s).{0,100}") {
        let decoded = EncodingDetector::new().detect(&with_bom(&[0xFF, 0xFE], &utf16le(&text)));
        prop_assert_eq!(decoded.method, DetectionMethod::Bom);
        prop_assert_eq!(decoded.encoding, UTF_16LE);
        prop_assert_eq!(decoded.text, text);
    }
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_large_gbk_document_decoded_past_sample() {
    let chapter = "第一章 风起\r\n天地之间，有一股神秘的力量正在苏醒。少年站在山巅，望着远方的云海。\r\n";
    let text = chapter.repeat(2_000);
    let (bytes, _, _) = GBK.encode(&text);
    assert!(bytes.len() > DetectorConfig::default().sample_len);

    let decoded = EncodingDetector::new().detect(&bytes);
    assert_eq!(decoded.encoding, GBK);
    assert_eq!(decoded.method, DetectionMethod::Scored);
    assert_eq!(decoded.text, text);
    assert!(decoded.confidence > 0.9);
}

#[test]
fn test_utf8_chinese_not_mistaken_for_legacy() {
    let text = "第一章 风起\n天地之间，有一股神秘的力量正在苏醒。".repeat(50);
    let decoded = EncodingDetector::new().detect(text.as_bytes());
    assert_eq!(decoded.encoding, UTF_8);
    assert_eq!(decoded.text, text);
}

#[test]
fn test_gbk_candidate_scores_highest() {
    let (bytes, _, _) = GBK.encode("少年站在山巅，望着远方的云海。");
    let scores = EncodingDetector::new().score_candidates(&bytes);
    let best = scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .unwrap();
    assert_eq!(best.encoding, GBK);
}

#[test]
fn test_english_text_is_utf8() {
    let decoded = EncodingDetector::new().detect(b"Chapter 1\nIt was a dark and stormy night.\n");
    assert_eq!(decoded.encoding, UTF_8);
    assert_eq!(decoded.method, DetectionMethod::Scored);
}
