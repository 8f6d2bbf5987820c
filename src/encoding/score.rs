//! Character classification and plausibility scoring for decoded text.

/// Per-class character counts for a decoded sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharStats {
    pub cjk: usize,
    pub other_script: usize,
    pub latin: usize,
    pub digit: usize,
    pub punct: usize,
    pub whitespace: usize,
    pub replacement: usize,
    pub control: usize,
    pub total: usize,
}

impl CharStats {
    /// Classify every character of `text`.
    pub fn collect(text: &str) -> Self {
        let mut stats = CharStats::default();
        for c in text.chars() {
            stats.total += 1;
            match c {
                '\u{FFFD}' => stats.replacement += 1,
                '\n' | '\r' | '\t' => stats.whitespace += 1,
                c if c.is_control() => stats.control += 1,
                c if c.is_whitespace() => stats.whitespace += 1,
                c if c.is_ascii_alphabetic() => stats.latin += 1,
                c if is_cjk(c) => stats.cjk += 1,
                c if c.is_numeric() => stats.digit += 1,
                c if is_punctuation(c) => stats.punct += 1,
                c if is_other_script(c) => stats.other_script += 1,
                _ => {}
            }
        }
        stats
    }

    /// Characters a human would accept as part of running text.
    pub fn readable(&self) -> usize {
        self.cjk + self.other_script + self.latin + self.digit + self.punct + self.whitespace
    }

    pub fn readable_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.readable() as f64 / self.total as f64
    }

    pub fn replacement_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.replacement as f64 / self.total as f64
    }

    /// Weighted plausibility score. CJK dominates because the corpus is
    /// mostly Chinese; replacement and control characters are heavy penalties.
    pub fn score(&self) -> f64 {
        3.0 * self.cjk as f64
            + 2.0 * self.other_script as f64
            + self.latin as f64
            + self.digit as f64
            + 0.5 * self.punct as f64
            + 100.0 * self.readable_ratio()
            - 20.0 * self.replacement as f64
            - 5.0 * self.control as f64
    }
}

/// Han ideographs, kana and Hangul syllables.
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF       // Hiragana, Katakana
        | 0x3400..=0x4DBF     // CJK Extension A
        | 0x4E00..=0x9FFF     // CJK Unified Ideographs
        | 0xAC00..=0xD7AF     // Hangul Syllables
        | 0xF900..=0xFAFF     // CJK Compatibility Ideographs
        | 0x20000..=0x2FA1F   // Supplementary ideographic planes
    )
}

/// ASCII, general, CJK and full-width punctuation.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(c as u32,
            0x00A1..=0x00BF       // Latin-1 punctuation and signs
            | 0x2010..=0x205E     // General Punctuation
            | 0x3001..=0x303F     // CJK Symbols and Punctuation
            | 0xFE30..=0xFE4F     // CJK Compatibility Forms
            | 0xFF01..=0xFF0F
            | 0xFF1A..=0xFF20
            | 0xFF3B..=0xFF40
            | 0xFF5B..=0xFF65     // Full-width punctuation
        )
}

/// Letters of the alphabetic scripts novels are plausibly written in,
/// beyond ASCII. Symbol blocks and rarely used phonetic scripts are not
/// counted, so mis-decoded bytes that land there do not earn points.
pub fn is_other_script(c: char) -> bool {
    c.is_alphabetic()
        && matches!(c as u32,
            0x00C0..=0x024F       // Latin-1 letters, Latin Extended-A/B
            | 0x0370..=0x052F     // Greek, Cyrillic
            | 0x0530..=0x06FF     // Armenian, Hebrew, Arabic
            | 0x0E00..=0x0E7F     // Thai
            | 0x1E00..=0x1EFF     // Latin Extended Additional
        )
}
