//! Lexer modes.
//!
//! Each [`Status`] knows how to recognize the next token at a buffer offset,
//! which token closes it, and which tokens open a nested mode. The
//! [`Scanner`](crate::Scanner) keeps these on a stack.

use std::fmt;

use crate::chars::{match_identifier, match_name, match_number, match_whitespace};
use crate::token::{Token, TokenKind};

/// A scanning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Selector text outside any bracket, parenthesis or string.
    Default,
    /// Inside `'...'`.
    SingleQuoteString,
    /// Inside `"..."`.
    DoubleQuoteString,
    /// Inside `[...]`.
    AttributeValue,
    /// Inside the `(...)` of a functional pseudo-class.
    PseudoArgument,
    /// Inside `/* ... */`.
    Comment,
}

const ATTRIBUTE_OPERATORS: [&str; 6] = ["~=", "|=", "^=", "$=", "*=", "="];

impl Status {
    /// Recognize the token at `offset`, or `None` if this mode has no token
    /// for the text there.
    pub fn token_at(self, buffer: &str, offset: usize) -> Option<Token> {
        let rest = buffer.get(offset..)?;
        if rest.is_empty() {
            return None;
        }

        let (kind, len) = match self {
            Status::Default => default_token(rest)?,
            Status::SingleQuoteString => string_token(rest, '\'', TokenKind::SingleQuoteEnd)?,
            Status::DoubleQuoteString => string_token(rest, '"', TokenKind::DoubleQuoteEnd)?,
            Status::AttributeValue => attribute_token(rest)?,
            Status::PseudoArgument => argument_token(rest)?,
            Status::Comment => comment_token(rest)?,
        };

        Some(Token::new(kind, &rest[..len], offset))
    }

    /// Whether `token` closes this mode.
    pub fn is_end_token(self, token: &Token) -> bool {
        matches!(
            (self, token.kind),
            (Status::SingleQuoteString, TokenKind::SingleQuoteEnd)
                | (Status::DoubleQuoteString, TokenKind::DoubleQuoteEnd)
                | (Status::AttributeValue, TokenKind::AttributeEnd)
                | (Status::PseudoArgument, TokenKind::ParenthesesEnd)
                | (Status::Comment, TokenKind::CommentEnd)
                | (Status::Default, TokenKind::ParenthesesEnd | TokenKind::AttributeEnd)
        )
    }

    /// The mode `token` opens, if any.
    pub fn new_status(self, token: &Token) -> Option<Status> {
        match (self, token.kind) {
            (Status::SingleQuoteString | Status::DoubleQuoteString | Status::Comment, _) => None,
            (_, TokenKind::SingleQuoteStart) => Some(Status::SingleQuoteString),
            (_, TokenKind::DoubleQuoteStart) => Some(Status::DoubleQuoteString),
            (_, TokenKind::CommentStart) => Some(Status::Comment),
            (Status::Default | Status::PseudoArgument, TokenKind::AttributeStart) => {
                Some(Status::AttributeValue)
            }
            (Status::Default | Status::PseudoArgument, TokenKind::ParenthesesStart) => {
                Some(Status::PseudoArgument)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Default => "selector",
            Status::SingleQuoteString => "single-quoted string",
            Status::DoubleQuoteString => "double-quoted string",
            Status::AttributeValue => "attribute selector",
            Status::PseudoArgument => "pseudo-class argument",
            Status::Comment => "comment",
        };
        f.write_str(name)
    }
}

fn default_token(rest: &str) -> Option<(TokenKind, usize)> {
    if let Some(len) = match_whitespace(rest) {
        return Some((TokenKind::Whitespace, len));
    }
    if rest.starts_with("/*") {
        return Some((TokenKind::CommentStart, 2));
    }

    let c = rest.chars().next()?;
    let token = match c {
        ':' if rest.starts_with("::") => {
            (TokenKind::PseudoElement, 2 + match_identifier(&rest[2..])?)
        }
        ':' => (TokenKind::PseudoClass, 1 + match_identifier(&rest[1..])?),
        '.' => (TokenKind::ClassSelector, 1 + match_identifier(&rest[1..])?),
        '#' => (TokenKind::IdSelector, 1 + match_name(&rest[1..])?),
        '*' => (TokenKind::Universal, 1),
        '|' => (TokenKind::NamespaceSeparator, 1),
        '>' | '+' | '~' => (TokenKind::Combinator, 1),
        ',' => (TokenKind::Separator, 1),
        '[' => (TokenKind::AttributeStart, 1),
        '(' => (TokenKind::ParenthesesStart, 1),
        ')' => (TokenKind::ParenthesesEnd, 1),
        ']' => (TokenKind::AttributeEnd, 1),
        _ => (TokenKind::Identifier, match_identifier(rest)?),
    };
    Some(token)
}

/// Closing quote first, then a backslash pair, then the longest literal run.
/// Only the quote itself and the backslash can be escaped.
fn string_token(rest: &str, quote: char, end: TokenKind) -> Option<(TokenKind, usize)> {
    if rest.starts_with(quote) {
        return Some((end, quote.len_utf8()));
    }
    if let Some(escaped) = rest.strip_prefix('\\') {
        return escaped
            .starts_with([quote, '\\'])
            .then_some((TokenKind::EscapedChar, 2));
    }

    let len = rest
        .find(|c: char| c == '\\' || c == quote)
        .unwrap_or(rest.len());
    (len > 0).then_some((TokenKind::StringChars, len))
}

fn quote_start(rest: &str) -> Option<(TokenKind, usize)> {
    match rest.chars().next()? {
        '"' => Some((TokenKind::DoubleQuoteStart, 1)),
        '\'' => Some((TokenKind::SingleQuoteStart, 1)),
        _ => None,
    }
}

fn attribute_token(rest: &str) -> Option<(TokenKind, usize)> {
    if let Some(len) = match_whitespace(rest) {
        return Some((TokenKind::Whitespace, len));
    }
    if rest.starts_with("/*") {
        return Some((TokenKind::CommentStart, 2));
    }
    if let Some(token) = quote_start(rest) {
        return Some(token);
    }
    if rest.starts_with(']') {
        return Some((TokenKind::AttributeEnd, 1));
    }
    if let Some(op) = ATTRIBUTE_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
        return Some((TokenKind::AttributeOperator, op.len()));
    }

    match rest.chars().next()? {
        '*' => Some((TokenKind::Universal, 1)),
        '|' => Some((TokenKind::NamespaceSeparator, 1)),
        _ => match_identifier(rest)
            .map(|len| (TokenKind::Identifier, len))
            .or_else(|| match_number(rest).map(|len| (TokenKind::Number, len))),
    }
}

fn argument_token(rest: &str) -> Option<(TokenKind, usize)> {
    if rest.starts_with(')') {
        return Some((TokenKind::ParenthesesEnd, 1));
    }
    if let Some(token) = quote_start(rest) {
        return Some(token);
    }
    if let Some(len) = match_number(rest) {
        return Some((TokenKind::Number, len));
    }
    default_token(rest)
}

fn comment_token(rest: &str) -> Option<(TokenKind, usize)> {
    if rest.starts_with("*/") {
        return Some((TokenKind::CommentEnd, 2));
    }
    let len = rest.find("*/").unwrap_or(rest.len());
    Some((TokenKind::CommentText, len))
}
