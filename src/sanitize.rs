//! Text normalization applied between decoding and segmentation.

/// Normalize decoded text.
///
/// - `\r\n` and lone `\r` become `\n`
/// - byte-order-mark characters (U+FEFF) are removed
/// - tabs are expanded, then every run of whitespace inside a line
///   (including U+3000 and NBSP) becomes a single space
/// - runs of 4+ blank lines are collapsed to 2
/// - lines are trimmed and lines left empty are dropped
/// - the result is trimmed
///
/// Blank lines are dropped after collapsing, so the output has exactly one
/// `\n` between non-empty lines. The function is idempotent.
pub fn sanitize(input: &str) -> String {
    let unified = unify_line_breaks(input);
    let collapsed = collapse_blank_lines(&unified);

    let mut out = String::with_capacity(collapsed.len());
    for line in collapsed.split('\n') {
        let line = normalize_line(line);
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
    }
    out
}

fn unify_line_breaks(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// At most two consecutive blank lines survive.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for (i, line) in text.split('\n').enumerate() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;
    for c in line.chars() {
        match c {
            '\u{FEFF}' => {}
            '\t' => pending_space = true,
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }
    out
}
