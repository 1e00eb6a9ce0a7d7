//! Line codec for `key=value` translation files.
//!
//! Both the dictionary and the unresolved ledger store one pair per line.
//! A backslash escapes the characters that would otherwise break the line
//! format: `\\`, `\=`, `\n`, `\r` and `\t`. Lines starting with `//` are
//! comments and never decode to a pair, so a leading `/` is written as `\/`.
//! Readers trim lines and strip byte order marks, so whitespace at either end
//! of a side (and a leading BOM) is written as `\u{hex}`. An encoded line
//! never starts or ends with whitespace.

use std::str::Chars;

/// Separator between the encoded key and the encoded value
pub const SEPARATOR: char = '=';

const COMMENT_PREFIX: &str = "//";

/// Escape a string so it can sit on either side of a `key=value` line
pub fn encode(text: &str) -> String {
    let lead_end = text.len() - text.trim_start().len();
    let trail_start = text.trim_end().len();

    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        let at_edge = idx < lead_end || idx >= trail_start;
        match ch {
            '\\' => out.push_str("\\\\"),
            '=' => out.push_str("\\="),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '/' if idx == 0 => out.push_str("\\/"),
            ws if at_edge && ws.is_whitespace() || idx == 0 && ws == '\u{feff}' => {
                out.push_str(&format!("\\u{{{:x}}}", ws as u32));
            }
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`encode`].
///
/// Unknown escapes and a trailing lone backslash are kept verbatim.
pub fn decode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('=') => out.push('='),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('/') => out.push('/'),
            Some('u') => match take_unicode_escape(&mut chars) {
                Some(decoded) => out.push(decoded),
                None => out.push_str("\\u"),
            },
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Consume `{hex}` after a `\u`; leaves `chars` untouched when malformed
fn take_unicode_escape(chars: &mut Chars<'_>) -> Option<char> {
    let rest = chars.as_str();
    let body = rest.strip_prefix('{')?;
    let close = body.find('}')?;
    let decoded = u32::from_str_radix(&body[..close], 16)
        .ok()
        .and_then(char::from_u32)?;
    *chars = body[close + 1..].chars();
    Some(decoded)
}

/// Encode a pair into a single line (without the trailing newline)
pub fn encode_line(key: &str, value: &str) -> String {
    format!("{}{}{}", encode(key), SEPARATOR, encode(value))
}

/// Split a line at its first unescaped `=` and decode both halves.
///
/// Returns `None` for comments and for lines without a separator.
pub fn decode_line(line: &str) -> Option<(String, String)> {
    if line.starts_with(COMMENT_PREFIX) {
        return None;
    }

    let split_at = find_separator(line)?;
    let key = decode(&line[..split_at]);
    let value = decode(&line[split_at + SEPARATOR.len_utf8()..]);
    Some((key, value))
}

/// Byte position of the first `=` that is not preceded by an escaping backslash
fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            SEPARATOR => return Some(idx),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
