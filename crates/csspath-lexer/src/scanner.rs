use tracing::trace;

use crate::status::Status;
use crate::token::{Token, TokenKind};
use crate::{LexError, LexErrorReason};

/// A status on the stack, with the offset of the token that opened it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    status: Status,
    opened_at: usize,
}

/// CSS selector scanner.
///
/// Drives a stack of [`Status`] modes over the source buffer. The scanner
/// knows nothing about selector grammar: it asks the active status for the
/// next token, then pops on an end token or pushes the status the token
/// opens.
///
/// - Byte offsets into the source, only ever increasing
/// - `Default` at the bottom of the stack, never popped
/// - An `Eof` token closes every successful scan
pub struct Scanner<'a> {
    buffer: &'a str,
    offset: usize,
    stack: Vec<Frame>,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(buffer: &'a str) -> Self {
        Self {
            buffer,
            offset: 0,
            stack: vec![Frame {
                status: Status::Default,
                opened_at: 0,
            }],
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    /// The status currently on top of the stack.
    pub fn status(&self) -> Status {
        self.top().status
    }

    /// Number of nested statuses, `Default` included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn scan_tokens(&mut self) -> Result<(), LexError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        let open = self.top();
        if open.status != Status::Default {
            return Err(LexError {
                offset: open.opened_at,
                reason: LexErrorReason::Unterminated(open.status),
            });
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.buffer.len()));
        Ok(())
    }

    /// Scan one token under the active status and apply its transition.
    fn scan_token(&mut self) -> Result<(), LexError> {
        let status = self.status();
        let Some(token) = status.token_at(self.buffer, self.offset) else {
            return Err(self.unexpected_character());
        };

        self.offset = token.end();

        if status.is_end_token(&token) {
            self.pop(&token)?;
        } else if let Some(next) = status.new_status(&token) {
            trace!(from = %status, to = %next, offset = token.offset, "push status");
            self.stack.push(Frame {
                status: next,
                opened_at: token.offset,
            });
        }

        self.tokens.push(token);
        Ok(())
    }

    fn pop(&mut self, token: &Token) -> Result<(), LexError> {
        if self.stack.len() <= 1 {
            return Err(LexError {
                offset: token.offset,
                reason: LexErrorReason::UnbalancedEnd(token.text.clone()),
            });
        }
        let closed = self.stack.pop();
        trace!(
            status = ?closed.map(|f| f.status),
            offset = token.offset,
            "pop status"
        );
        Ok(())
    }

    // --- Helpers ---

    fn top(&self) -> Frame {
        // The stack starts with `Default` and `pop` refuses to remove it.
        self.stack[self.stack.len() - 1]
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    fn unexpected_character(&self) -> LexError {
        let found = self.buffer[self.offset..].chars().next().unwrap_or('\0');
        LexError {
            offset: self.offset,
            reason: LexErrorReason::UnexpectedCharacter(found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return token kinds.
    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    /// Helper: tokenize and return `(kind, text)` pairs.
    fn pairs(source: &str) -> Vec<(TokenKind, String)> {
        Scanner::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn pair(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    #[test]
    fn test_empty_source() {
        let toks = Scanner::tokenize("").unwrap();
        assert_eq!(toks, vec![Token::new(TokenKind::Eof, "", 0)]);
    }

    #[test]
    fn test_eof_offset_is_source_length() {
        let toks = Scanner::tokenize("div").unwrap();
        assert_eq!(toks.last().unwrap().offset, 3);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let source = "ul > li.item:nth-child(2n+1)[data-x=\"a,b\"]";
        let toks = Scanner::tokenize(source).unwrap();
        let mut expected = 0;
        for tok in &toks {
            assert_eq!(tok.offset, expected, "gap before {tok:?}");
            expected = tok.end();
        }
        assert_eq!(expected, source.len());
    }

    #[test]
    fn test_rescan_is_identical() {
        let source = "a[href^='http'] , p ~ span";
        assert_eq!(
            Scanner::tokenize(source).unwrap(),
            Scanner::tokenize(source).unwrap()
        );
    }

    // =========================================================================
    // Selector text
    // =========================================================================

    #[test]
    fn test_compound_selector() {
        assert_eq!(
            pairs("div.item#main"),
            vec![
                pair(TokenKind::Identifier, "div"),
                pair(TokenKind::ClassSelector, ".item"),
                pair(TokenKind::IdSelector, "#main"),
                pair(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_combinators_and_whitespace() {
        assert_eq!(
            kinds("div > p"),
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Combinator,
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a+b~c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Combinator,
                TokenKind::Identifier,
                TokenKind::Combinator,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_selector_list() {
        assert_eq!(
            kinds("a,b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Separator,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_namespaced_type() {
        assert_eq!(
            kinds("svg|rect *|*"),
            vec![
                TokenKind::Identifier,
                TokenKind::NamespaceSeparator,
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Universal,
                TokenKind::NamespaceSeparator,
                TokenKind::Universal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_identifier_kept_raw() {
        assert_eq!(
            pairs(r"#a\:b"),
            vec![pair(TokenKind::IdSelector, r"#a\:b"), pair(TokenKind::Eof, "")]
        );
    }

    // =========================================================================
    // Attribute brackets and strings
    // =========================================================================

    #[test]
    fn test_attribute_with_double_quoted_value() {
        assert_eq!(
            pairs(r#"[data-x="a,b"]"#),
            vec![
                pair(TokenKind::AttributeStart, "["),
                pair(TokenKind::Identifier, "data-x"),
                pair(TokenKind::AttributeOperator, "="),
                pair(TokenKind::DoubleQuoteStart, "\""),
                pair(TokenKind::StringChars, "a,b"),
                pair(TokenKind::DoubleQuoteEnd, "\""),
                pair(TokenKind::AttributeEnd, "]"),
                pair(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        assert_eq!(
            pairs(r#"[x="a\"b"]"#),
            vec![
                pair(TokenKind::AttributeStart, "["),
                pair(TokenKind::Identifier, "x"),
                pair(TokenKind::AttributeOperator, "="),
                pair(TokenKind::DoubleQuoteStart, "\""),
                pair(TokenKind::StringChars, "a"),
                pair(TokenKind::EscapedChar, r#"\""#),
                pair(TokenKind::StringChars, "b"),
                pair(TokenKind::DoubleQuoteEnd, "\""),
                pair(TokenKind::AttributeEnd, "]"),
                pair(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_adjacent_escapes() {
        assert_eq!(
            pairs(r#"[x='\\\'']"#)[4..7].to_vec(),
            vec![
                pair(TokenKind::EscapedChar, r"\\"),
                pair(TokenKind::EscapedChar, r"\'"),
                pair(TokenKind::SingleQuoteEnd, "'"),
            ]
        );
    }

    #[test]
    fn test_bracket_inside_string_is_text() {
        assert_eq!(
            kinds("[x=']']"),
            vec![
                TokenKind::AttributeStart,
                TokenKind::Identifier,
                TokenKind::AttributeOperator,
                TokenKind::SingleQuoteStart,
                TokenKind::StringChars,
                TokenKind::SingleQuoteEnd,
                TokenKind::AttributeEnd,
                TokenKind::Eof,
            ]
        );
    }

    // =========================================================================
    // Pseudo-class arguments
    // =========================================================================

    #[test]
    fn test_nth_argument() {
        assert_eq!(
            pairs(":nth-child(2n+1)"),
            vec![
                pair(TokenKind::PseudoClass, ":nth-child"),
                pair(TokenKind::ParenthesesStart, "("),
                pair(TokenKind::Number, "2"),
                pair(TokenKind::Identifier, "n"),
                pair(TokenKind::Combinator, "+"),
                pair(TokenKind::Number, "1"),
                pair(TokenKind::ParenthesesEnd, ")"),
                pair(TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_nested_parentheses_balance() {
        assert_eq!(
            kinds(":not(:not(a))"),
            vec![
                TokenKind::PseudoClass,
                TokenKind::ParenthesesStart,
                TokenKind::PseudoClass,
                TokenKind::ParenthesesStart,
                TokenKind::Identifier,
                TokenKind::ParenthesesEnd,
                TokenKind::ParenthesesEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_attribute_inside_argument() {
        let k = kinds(":not([x=')'])");
        assert_eq!(k[2], TokenKind::AttributeStart);
        assert_eq!(k[k.len() - 2], TokenKind::ParenthesesEnd);
    }

    #[test]
    fn test_comment_is_scanned() {
        assert_eq!(
            kinds("a/* x */b"),
            vec![
                TokenKind::Identifier,
                TokenKind::CommentStart,
                TokenKind::CommentText,
                TokenKind::CommentEnd,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_unexpected_character() {
        let err = Scanner::tokenize("div $").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.reason, LexErrorReason::UnexpectedCharacter('$'));
    }

    #[test]
    fn test_unterminated_string_reports_opening_quote() {
        let err = Scanner::tokenize(r#"[x="abc]"#).unwrap_err();
        assert_eq!(err.offset, 3);
        assert_eq!(
            err.reason,
            LexErrorReason::Unterminated(Status::DoubleQuoteString)
        );
    }

    #[test]
    fn test_unterminated_bracket() {
        let err = Scanner::tokenize("[attr=").unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(err.reason, LexErrorReason::Unterminated(Status::AttributeValue));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Scanner::tokenize("a /* b").unwrap_err();
        assert_eq!(err.reason, LexErrorReason::Unterminated(Status::Comment));
    }

    #[test]
    fn test_stray_closing_delimiters() {
        let err = Scanner::tokenize("a)").unwrap_err();
        assert_eq!(err.offset, 1);
        assert_eq!(err.reason, LexErrorReason::UnbalancedEnd(")".into()));
        let err = Scanner::tokenize(":not(a))").unwrap_err();
        assert_eq!(err.offset, 7);
        assert_eq!(err.reason, LexErrorReason::UnbalancedEnd(")".into()));
        let err = Scanner::tokenize("[x]]").unwrap_err();
        assert_eq!(err.offset, 3);
        assert_eq!(err.reason, LexErrorReason::UnbalancedEnd("]".into()));
        assert_eq!(err.to_string(), "Lexer error at offset 3: unbalanced ']'");
    }

    #[test]
    fn test_unknown_string_escape() {
        let err = Scanner::tokenize(r#"[x="\26 y"]"#).unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.reason, LexErrorReason::UnexpectedCharacter('\\'));
        let err = Scanner::tokenize(r"[x='a\nb']").unwrap_err();
        assert_eq!(err.offset, 5);
        assert_eq!(err.reason, LexErrorReason::UnexpectedCharacter('\\'));
    }

    #[test]
    fn test_error_message() {
        let err = Scanner::tokenize("a ?").unwrap_err();
        assert_eq!(err.to_string(), "Lexer error at offset 2: unexpected character '?'");
    }

    #[test]
    fn test_scanner_starts_in_default() {
        let scanner = Scanner::new("a");
        assert_eq!(scanner.status(), Status::Default);
        assert_eq!(scanner.depth(), 1);
    }
}
