//! Rendering of payload bytes as a C array initializer.
use std::fmt::Write as _;

/// Renders `bytes` as `{b0,b1,...}` in decimal.
///
/// An empty slice renders as `{0}`: C++ has no zero-length arrays, so an
/// empty payload is emitted as a one byte array whose size constant is `0`.
pub fn array_literal(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "{0}".to_owned();
    }
    // "255," is the widest element.
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('{');
    let mut chunks = bytes.chunks_exact(4);
    for c in &mut chunks {
        // Writing into a String cannot fail.
        let _ = write!(out, "{},{},{},{},", c[0], c[1], c[2], c[3]);
    }
    for b in chunks.remainder() {
        let _ = write!(out, "{b},");
    }
    out.pop();
    out.push('}');
    out
}

/// Number of array elements [`array_literal`] emits for a payload of `len` bytes.
pub const fn array_len(len: usize) -> usize {
    if len == 0 { 1 } else { len }
}

/// Parses an initializer produced by [`array_literal`], ignoring whitespace.
///
/// Returns `None` if the text is not a brace-enclosed list of decimal bytes.
pub fn parse_array_literal(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let body = compact.strip_prefix('{')?.strip_suffix('}')?;
    if body.is_empty() {
        return Some(Vec::new());
    }
    body.split(',').map(|v| v.parse().ok()).collect()
}
