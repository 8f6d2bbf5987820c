//! Byte encoding inference for plain-text uploads.
//!
//! Detection runs in three steps:
//! 1. A byte-order mark, when present and cleanly decodable, is authoritative.
//! 2. Otherwise a fixed, ordered list of candidates is decoded over a prefix
//!    sample and scored with [`CharStats::score`]; the best candidate wins and
//!    earlier candidates win ties.
//! 3. If every candidate is rejected the buffer is decoded as lossy UTF-8.
//!
//! Nothing here returns an error: a failed candidate is simply out of the
//! running, and the last step cannot fail.

mod score;

pub use score::{CharStats, is_cjk, is_other_script, is_punctuation};

use encoding_rs::{BIG5, EUC_JP, EUC_KR, Encoding, GBK, SHIFT_JIS, UTF_8, UTF_16BE, UTF_16LE};
use log::{debug, info};

use crate::config::DetectorConfig;

/// The candidate encodings, in priority order.
pub fn candidates() -> [&'static Encoding; 8] {
    [UTF_8, UTF_16LE, UTF_16BE, GBK, BIG5, SHIFT_JIS, EUC_JP, EUC_KR]
}

/// How the encoding of a [`DecodedText`] was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// A byte-order mark named the encoding.
    Bom,
    /// The best-scoring candidate.
    Scored,
    /// Every candidate was rejected; lossy UTF-8 was used.
    Fallback,
}

/// Unicode text decoded from a raw buffer, with the encoding that produced it.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    /// 1.0 for a BOM, the readable share of the sample for a scored
    /// candidate, 0.0 for the lossy fallback.
    pub confidence: f64,
    pub method: DetectionMethod,
}

impl DecodedText {
    /// Encoding label, e.g. `"UTF-8"` or `"GBK"`.
    pub fn encoding_label(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Score of one candidate over the detection sample.
#[derive(Debug, Clone, Copy)]
pub struct CandidateScore {
    pub encoding: &'static Encoding,
    /// `f64::NEG_INFINITY` when the candidate could not decode the sample.
    pub score: f64,
}

/// Why a candidate was taken out of the running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    OddUtf16Length,
    NoUtf16Signature,
    TooManyReplacements,
    EmptyOutput,
    TooLarge,
    ValidUtf8,
}

/// Infers the byte encoding of a text buffer and decodes it.
#[derive(Debug, Clone, Default)]
pub struct EncodingDetector {
    config: DetectorConfig,
}

impl EncodingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Decode `bytes`, choosing the encoding as described in the module docs.
    pub fn detect(&self, bytes: &[u8]) -> DecodedText {
        if let Some(decoded) = decode_with_bom(bytes) {
            debug!("BOM indicates {}", decoded.encoding.name());
            return decoded;
        }

        if let Some(decoded) = self.detect_by_score(bytes) {
            return decoded;
        }

        info!("no candidate encoding decoded the buffer; using lossy UTF-8");
        DecodedText {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding: UTF_8,
            confidence: 0.0,
            method: DetectionMethod::Fallback,
        }
    }

    /// Score every candidate over the detection sample, in candidate order.
    pub fn score_candidates(&self, bytes: &[u8]) -> Vec<CandidateScore> {
        let (sample, is_whole) = self.sample(bytes);
        let multibyte_utf8 = is_multibyte_utf8(sample);
        candidates()
            .into_iter()
            .map(|encoding| {
                let score = attempt(encoding, sample, is_whole, multibyte_utf8)
                    .map(|text| CharStats::collect(&text).score())
                    .unwrap_or(f64::NEG_INFINITY);
                CandidateScore { encoding, score }
            })
            .collect()
    }

    fn detect_by_score(&self, bytes: &[u8]) -> Option<DecodedText> {
        let (sample, is_whole) = self.sample(bytes);
        let multibyte_utf8 = is_multibyte_utf8(sample);

        let mut best: Option<(&'static Encoding, String, CharStats, f64)> = None;
        for encoding in candidates() {
            let text = match attempt(encoding, sample, is_whole, multibyte_utf8) {
                Ok(text) => text,
                Err(reason) => {
                    debug!("candidate {} rejected: {:?}", encoding.name(), reason);
                    continue;
                }
            };
            let stats = CharStats::collect(&text);
            let score = stats.score();
            debug!("candidate {} scored {:.1}", encoding.name(), score);

            let better = match &best {
                Some((_, _, _, best_score)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((encoding, text, stats, score));
            }
        }

        let (encoding, sample_text, stats, score) = best?;
        let text = if is_whole {
            sample_text
        } else {
            decode_full(encoding, bytes)
        };
        let confidence = (stats.readable_ratio() * (1.0 - stats.replacement_ratio())).clamp(0.0, 1.0);
        info!(
            "detected {} (score {:.1}, confidence {:.2})",
            encoding.name(),
            score,
            confidence
        );

        Some(DecodedText {
            text,
            encoding,
            confidence,
            method: DetectionMethod::Scored,
        })
    }

    /// The prefix used for scoring, and whether it is the whole buffer.
    /// Sample length is kept even so UTF-16 code units are not split.
    fn sample<'a>(&self, bytes: &'a [u8]) -> (&'a [u8], bool) {
        let limit = self.config.sample_len.max(2) & !1;
        if bytes.len() <= limit {
            (bytes, true)
        } else {
            (&bytes[..limit], false)
        }
    }
}

/// Decode using a leading byte-order mark, if there is one and the rest of
/// the buffer decodes cleanly.
fn decode_with_bom(bytes: &[u8]) -> Option<DecodedText> {
    let (encoding, bom_len) = Encoding::for_bom(bytes)?;
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        debug!("{} BOM present but body is malformed", encoding.name());
        return None;
    }
    Some(DecodedText {
        text: text.into_owned(),
        encoding,
        confidence: 1.0,
        method: DetectionMethod::Bom,
    })
}

/// Legacy double-byte encodings decode well-formed UTF-8 into plausible
/// looking ideographs, so they are not considered once the sample is known
/// to be valid UTF-8 with multibyte sequences.
fn attempt(
    encoding: &'static Encoding,
    sample: &[u8],
    last: bool,
    multibyte_utf8: bool,
) -> Result<String, Rejection> {
    let legacy = encoding != UTF_8 && encoding != UTF_16LE && encoding != UTF_16BE;
    if legacy && multibyte_utf8 {
        return Err(Rejection::ValidUtf8);
    }
    decode_candidate(encoding, sample, last)
}

/// Valid multibyte UTF-8 characters needed per invalid sequence before a
/// sample still counts as UTF-8.
const MULTIBYTE_PER_INVALID: usize = 16;

/// True when `sample` is mostly UTF-8 with non-ASCII text.
///
/// A stray invalid byte here and there does not count against it, nor does
/// a sequence cut short at the end of the sample. GBK and friends read as
/// UTF-8 produce an invalid sequence every few characters.
fn is_multibyte_utf8(sample: &[u8]) -> bool {
    let mut multibyte = 0;
    let mut invalid = 0;
    let mut rest = sample;
    loop {
        match std::str::from_utf8(rest) {
            Ok(_) => {
                multibyte += count_lead_bytes(rest);
                break;
            }
            Err(e) => {
                let (valid, tail) = rest.split_at(e.valid_up_to());
                multibyte += count_lead_bytes(valid);
                let Some(len) = e.error_len() else {
                    break;
                };
                invalid += 1;
                rest = &tail[len..];
            }
        }
    }
    multibyte > 0 && invalid * MULTIBYTE_PER_INVALID <= multibyte
}

/// Non-ASCII characters in a well-formed UTF-8 slice.
fn count_lead_bytes(valid: &[u8]) -> usize {
    valid.iter().filter(|&&b| b >= 0xC0).count()
}

fn decode_candidate(encoding: &'static Encoding, bytes: &[u8], last: bool) -> Result<String, Rejection> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        check_utf16_signature(encoding, bytes, last)?;
    }

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length(bytes.len())
        .ok_or(Rejection::TooLarge)?;
    let mut text = String::with_capacity(capacity);
    let (_result, _read, had_errors) = decoder.decode_to_string(bytes, &mut text, last);

    if text.is_empty() && !bytes.is_empty() {
        return Err(Rejection::EmptyOutput);
    }
    if had_errors && CharStats::collect(&text).replacement_ratio() > 0.5 {
        return Err(Rejection::TooManyReplacements);
    }
    Ok(text)
}

/// UTF-16 decodes almost any even-length buffer without errors, so a
/// BOM-less candidate must look like UTF-16: even length, and at least one
/// zero high byte (ASCII spaces, digits or line breaks) in the right lane.
fn check_utf16_signature(encoding: &'static Encoding, bytes: &[u8], last: bool) -> Result<(), Rejection> {
    if last && bytes.len() % 2 != 0 {
        return Err(Rejection::OddUtf16Length);
    }
    let high_lane = if encoding == UTF_16LE { 1 } else { 0 };
    let has_zero_high = bytes.iter().skip(high_lane).step_by(2).any(|&b| b == 0);
    if !has_zero_high {
        return Err(Rejection::NoUtf16Signature);
    }
    Ok(())
}

fn decode_full(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}
