use alloc::vec::Vec;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Appends `src` as a quoted JSON string literal.
///
/// Quotes, backslashes and control characters are escaped, using the short
/// forms where JSON has one. U+2028 and U+2029 are escaped as well since
/// pre-2019 JavaScript parsers reject them raw.
pub(crate) fn write_escaped_str(out: &mut Vec<u8>, src: &str) {
    out.reserve(src.len() + 2);
    out.push(b'"');

    let bytes = src.as_bytes();
    let mut start = 0;
    for (i, c) in src.char_indices() {
        let short: &[u8] = match c {
            '"' => b"\\\"",
            '\\' => b"\\\\",
            '\n' => b"\\n",
            '\r' => b"\\r",
            '\t' => b"\\t",
            '\u{0008}' => b"\\b",
            '\u{000C}' => b"\\f",
            '\u{2028}' | '\u{2029}' => b"",
            c if c.is_control() => b"",
            _ => continue,
        };

        out.extend_from_slice(&bytes[start..i]);
        if short.is_empty() {
            write_unicode_escape(out, u32::from(c));
        } else {
            out.extend_from_slice(short);
        }
        start = i + c.len_utf8();
    }

    out.extend_from_slice(&bytes[start..]);
    out.push(b'"');
}

/// `\uXXXX` for a code point in the basic multilingual plane.
fn write_unicode_escape(out: &mut Vec<u8>, code: u32) {
    out.extend_from_slice(b"\\u");
    for shift in [12, 8, 4, 0] {
        out.push(HEX[((code >> shift) & 0xF) as usize]);
    }
}
