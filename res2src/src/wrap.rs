//! Reflowing of long generated lines.

/// Characters a line may be broken after.
pub const SEPARATORS: &[u8] = b", ";

/// Reflows `text` so that no line is longer than `width` bytes.
///
/// Each line is broken after the last separator that fits; continuation lines
/// start with `indent` spaces, which count towards the width. Separators in a
/// line's leading whitespace or inside a double-quoted string literal are not
/// break points. A token that cannot fit is kept whole up to the next break
/// point, and if there is none the line is cut at the width. Only `'\n'` and
/// indentation are ever inserted.
pub fn wrap(text: &str, width: usize, indent: usize) -> String {
    reflow(text, width, indent, true)
}

/// Like [`wrap`], but never cuts a line inside a token.
///
/// A trailing token wider than the remaining width is kept whole, so the line
/// may exceed `width`. Generated code goes through this variant, since a cut
/// identifier no longer compiles.
pub fn wrap_tokens(text: &str, width: usize, indent: usize) -> String {
    reflow(text, width, indent, false)
}

fn reflow(text: &str, width: usize, indent: usize, cut: bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1) * (indent + 1));
    for line in text.split_inclusive('\n') {
        let (body, eol) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        wrap_line(body, width, indent, cut, &mut out);
        out.push_str(eol);
    }
    out
}

fn wrap_line(line: &str, width: usize, indent: usize, cut: bool, out: &mut String) {
    let breaks = break_points(line.as_bytes());
    let mut start = 0;
    let mut budget = width.max(1);
    while line.len() - start > budget {
        let limit = start + budget;
        let end = match breaks[start..limit].iter().rposition(|&b| b) {
            Some(i) => start + i + 1,
            None => match breaks[limit..].iter().position(|&b| b) {
                Some(i) => limit + i + 1,
                None if cut => char_boundary_at_or_after(line, limit),
                None => break,
            },
        };
        if end >= line.len() {
            break;
        }
        out.push_str(&line[start..end]);
        out.push('\n');
        out.extend(std::iter::repeat_n(' ', indent));
        start = end;
        budget = width.saturating_sub(indent).max(1);
    }
    out.push_str(&line[start..]);
}

/// Marks the separators a line may be broken after.
fn break_points(line: &[u8]) -> Vec<bool> {
    let mut points = vec![false; line.len()];
    let (mut in_string, mut escaped, mut started) = (false, false, false);
    for (i, &b) in line.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if SEPARATORS.contains(&b) {
            points[i] = started;
        } else {
            started = true;
            in_string = b == b'"';
        }
    }
    // Break after the last separator of a run, so ", " stays on the earlier line.
    for i in 1..line.len() {
        if SEPARATORS.contains(&line[i]) && points[i] {
            points[i - 1] = false;
        }
    }
    points
}

fn char_boundary_at_or_after(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
