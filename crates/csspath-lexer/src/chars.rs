//! Character classification shared by the lexer modes.
//!
//! Every matcher takes the remaining buffer and returns the byte length of
//! the match, or `None` when nothing matches at the start of `rest`.

pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// Maximal run of whitespace.
pub(crate) fn match_whitespace(rest: &str) -> Option<usize> {
    let len = rest.find(|c: char| !is_whitespace(c)).unwrap_or(rest.len());
    (len > 0).then_some(len)
}

/// A CSS escape: `\` followed by 1-6 hex digits and an optional whitespace,
/// or `\` followed by any character other than a newline.
pub(crate) fn match_escape(rest: &str) -> Option<usize> {
    let after = rest.strip_prefix('\\')?;
    let first = after.chars().next()?;
    if matches!(first, '\n' | '\r' | '\x0C') {
        return None;
    }
    if !first.is_ascii_hexdigit() {
        return Some(1 + first.len_utf8());
    }

    let digits = after
        .bytes()
        .take(6)
        .take_while(u8::is_ascii_hexdigit)
        .count();
    let tail = &after[digits..];
    let trailing = if tail.starts_with("\r\n") {
        2
    } else if tail.starts_with(is_whitespace) {
        1
    } else {
        0
    };
    Some(1 + digits + trailing)
}

fn match_name_start(rest: &str) -> Option<usize> {
    let c = rest.chars().next()?;
    if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() {
        Some(c.len_utf8())
    } else if c == '\\' {
        match_escape(rest)
    } else {
        None
    }
}

fn match_name_char(rest: &str) -> Option<usize> {
    let c = rest.chars().next()?;
    if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
        Some(c.len_utf8())
    } else if c == '\\' {
        match_escape(rest)
    } else {
        None
    }
}

/// Maximal run of name characters (the body of `#id`).
pub(crate) fn match_name(rest: &str) -> Option<usize> {
    let mut len = 0;
    while let Some(step) = match_name_char(&rest[len..]) {
        len += step;
    }
    (len > 0).then_some(len)
}

/// An identifier: `--name`, `-name` or `name`.
pub(crate) fn match_identifier(rest: &str) -> Option<usize> {
    let start = if rest.starts_with("--") {
        2
    } else {
        let dash = usize::from(rest.starts_with('-'));
        dash + match_name_start(&rest[dash..])?
    };
    Some(start + match_name(&rest[start..]).unwrap_or(0))
}

/// An integer with an optional leading minus sign.
pub(crate) fn match_number(rest: &str) -> Option<usize> {
    let sign = usize::from(rest.starts_with('-'));
    let digits = rest[sign..].bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0).then_some(sign + digits)
}

/// Decode CSS escapes in an identifier as written in the source.
///
/// ```
/// use csspath_lexer::unescape_identifier;
///
/// assert_eq!(unescape_identifier(r"foo\:bar"), "foo:bar");
/// assert_eq!(unescape_identifier(r"\31 23"), "123");
/// ```
pub fn unescape_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        let Some(len) = match_escape(rest) else {
            // Dangling backslash: keep it literally.
            out.push('\\');
            rest = &rest[1..];
            continue;
        };

        let body = &rest[1..len];
        if body.starts_with(|c: char| c.is_ascii_hexdigit()) {
            // Only a hex escape swallows the whitespace that ends it.
            let digits = body.trim_end_matches(is_whitespace);
            let decoded = u32::from_str_radix(digits, 16)
                .ok()
                .filter(|&cp| cp != 0)
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            out.push(decoded);
        } else {
            out.push_str(body);
        }
        rest = &rest[len..];
    }

    out.push_str(rest);
    out
}
