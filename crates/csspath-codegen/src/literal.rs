//! XPath 1.0 string literals and names.

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath 1.0 has no escape syntax: a value without apostrophes is wrapped in
/// `'...'`, one without double quotes in `"..."`, and a value containing both
/// becomes a `concat()` that splits on the apostrophe.
///
/// ```
/// use csspath_codegen::literal::quote_literal;
///
/// assert_eq!(quote_literal("a\"b"), "'a\"b'");
/// assert_eq!(quote_literal("it's"), "\"it's\"");
/// assert_eq!(quote_literal("'\"'"), "concat(\"'\", '\"', \"'\")");
/// ```
pub fn quote_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let mut parts = Vec::new();
    for (i, chunk) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !chunk.is_empty() {
            parts.push(format!("'{chunk}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

/// Whether `name` can be written as a bare XPath name test (an XML NCName).
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start = |c: char| {
        c.is_ascii_alphabetic() || c == '_' || (!c.is_ascii() && c.is_alphabetic())
    };
    let rest = |c: char| {
        start(c)
            || c.is_ascii_digit()
            || c == '-'
            || c == '.'
            || (!c.is_ascii() && c.is_alphanumeric())
    };
    start(first) && chars.all(rest)
}
