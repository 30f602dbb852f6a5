//! Selector parser.
//!
//! Parses the token stream from `csspath-lexer` into a `SelectorList` AST.
//! Whitespace tokens are significant here: a run separating two compound
//! selectors is the descendant combinator, anywhere else it is skipped.
//!
//! Uses recursive descent, one method per grammar level.

use csspath_lexer::{unescape_identifier, LexErrorReason, Scanner, Status, Token, TokenKind};
use tracing::{debug, trace};

use crate::ast::{
    AttributeMatcher, AttributeOperator, AttributeSelector, Combinator, Compound,
    NamespacePrefix, PseudoClass, Selector, SelectorList, SimpleSelector,
};
use crate::nth::Nth;
use crate::{Expected, ParseError, SyntaxError};

/// Nesting limit for `:not()` / `:has()` groups.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A qualified name: namespace prefix (if written) and local name (`None` for `*`).
type QualifiedName = (Option<NamespacePrefix>, Option<String>);

/// CSS selector parser.
///
/// Converts a flat token stream into a `SelectorList` using recursive
/// descent. Comment tokens are dropped on construction.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::CommentStart | TokenKind::CommentText | TokenKind::CommentEnd
                )
            })
            .collect();

        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map_or(0, Token::end);
            tokens.push(Token::new(TokenKind::Eof, "", end));
        }

        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply `:not()` / `:has()` groups may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse selector source into an AST.
    pub fn parse(source: &str) -> Result<SelectorList, ParseError> {
        Self::parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
    }

    /// Parse selector source with a custom nesting limit.
    pub fn parse_with_max_depth(
        source: &str,
        max_depth: usize,
    ) -> Result<SelectorList, ParseError> {
        let tokens = Scanner::tokenize(source).map_err(|e| match e.reason {
            // An open bracket or parenthesis at end of input is a missing
            // delimiter, not a character the scanner failed on.
            LexErrorReason::Unterminated(Status::AttributeValue) => {
                ParseError::Syntax(SyntaxError::new(source.len(), Expected::Token("]")))
            }
            LexErrorReason::Unterminated(Status::PseudoArgument) => {
                ParseError::Syntax(SyntaxError::new(source.len(), Expected::Token(")")))
            }
            _ => ParseError::Lex(e),
        })?;

        let list = Parser::new(tokens)
            .with_max_depth(max_depth)
            .parse_selectors()?;
        debug!(source, selectors = list.len(), "parsed selector list");
        Ok(list)
    }

    /// Parse the whole token stream as a selector list.
    pub fn parse_selectors(&mut self) -> Result<SelectorList, SyntaxError> {
        self.parse_selector_list(TokenKind::Eof)
    }

    // =========================================================================
    // Selector lists and combinators
    // =========================================================================

    /// Parse `selector (, selector)*` up to (not including) `close`.
    fn parse_selector_list(&mut self, close: TokenKind) -> Result<SelectorList, SyntaxError> {
        let mut selectors = Vec::new();

        loop {
            self.skip_whitespace();
            selectors.push(self.parse_selector()?);
            self.skip_whitespace();

            if self.check(TokenKind::Separator) {
                self.advance();
                continue;
            }
            break;
        }

        if !self.check(close) {
            let expected = if close == TokenKind::Eof {
                Expected::EndOfInput
            } else {
                Expected::Token(")")
            };
            return Err(self.error(expected));
        }

        Ok(SelectorList { selectors })
    }

    /// Parse compound selectors joined by combinators.
    fn parse_selector(&mut self) -> Result<Selector, SyntaxError> {
        let mut selector = Selector::compound(self.parse_compound()?);

        loop {
            let had_whitespace = self.skip_whitespace();

            let kind = if self.check(TokenKind::Combinator) {
                let token = self.advance();
                let kind = Combinator::from_symbol(&token.text)
                    .ok_or_else(|| SyntaxError::new(token.offset, Expected::Selector))?;
                self.skip_whitespace();
                kind
            } else if had_whitespace && self.starts_compound() {
                Combinator::Descendant
            } else {
                break;
            };

            let right = self.parse_compound()?;
            trace!(?kind, offset = right.offset, "combinator");
            selector.rest.push((kind, right));
        }

        Ok(selector)
    }

    // =========================================================================
    // Compound selectors
    // =========================================================================

    /// Parse a type or universal selector followed by any number of
    /// class, id, attribute and pseudo-class selectors.
    fn parse_compound(&mut self) -> Result<Compound, SyntaxError> {
        let offset = self.peek().offset;
        let mut selectors = Vec::new();

        if let Some((namespace, name)) = self.parse_qualified_name(Expected::ElementName)? {
            selectors.push(match name {
                Some(name) => SimpleSelector::Type { name, namespace },
                None => SimpleSelector::Universal { namespace },
            });
        }

        loop {
            let token = self.peek();
            let simple = match token.kind {
                TokenKind::ClassSelector => {
                    let name = unescape_identifier(&token.text[1..]);
                    self.advance();
                    SimpleSelector::Class(name)
                }
                TokenKind::IdSelector => {
                    let name = unescape_identifier(&token.text[1..]);
                    self.advance();
                    SimpleSelector::Id(name)
                }
                TokenKind::AttributeStart => SimpleSelector::Attribute(self.parse_attribute()?),
                TokenKind::PseudoClass => SimpleSelector::PseudoClass(self.parse_pseudo_class()?),
                TokenKind::PseudoElement => {
                    return Err(SyntaxError::new(
                        token.offset,
                        Expected::Unsupported(token.text.clone()),
                    ));
                }
                TokenKind::Identifier | TokenKind::Universal | TokenKind::NamespaceSeparator => {
                    return Err(self.error(Expected::TypeSelectorFirst));
                }
                _ => break,
            };
            selectors.push(simple);
        }

        if selectors.is_empty() {
            return Err(self.error(Expected::Selector));
        }

        Ok(Compound { selectors, offset })
    }

    /// Parse `name`, `*`, `ns|name`, `*|name`, `|name` and the `*` forms.
    ///
    /// Returns `None` without consuming anything when no name starts here.
    fn parse_qualified_name(
        &mut self,
        expected_local: Expected,
    ) -> Result<Option<QualifiedName>, SyntaxError> {
        let prefix = match self.peek().kind {
            TokenKind::Identifier | TokenKind::Universal => {
                let token = self.advance();
                let name = (token.kind == TokenKind::Identifier)
                    .then(|| unescape_identifier(&token.text));
                if !self.check(TokenKind::NamespaceSeparator) {
                    return Ok(Some((None, name)));
                }
                match name {
                    Some(prefix) => NamespacePrefix::Named(prefix),
                    None => NamespacePrefix::Any,
                }
            }
            TokenKind::NamespaceSeparator => NamespacePrefix::NoNamespace,
            _ => return Ok(None),
        };

        self.advance(); // consume `|`

        let local = match self.peek().kind {
            TokenKind::Identifier => Some(unescape_identifier(&self.advance().text)),
            TokenKind::Universal => {
                self.advance();
                None
            }
            _ => return Err(self.error(expected_local)),
        };

        Ok(Some((Some(prefix), local)))
    }

    // =========================================================================
    // Attribute selectors
    // =========================================================================

    /// Parse `[name]` or `[name op value]`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SyntaxError> {
        self.advance(); // consume `[`
        self.skip_whitespace();

        let name_offset = self.peek().offset;
        let (namespace, name) = match self.parse_qualified_name(Expected::AttributeName)? {
            Some((namespace, Some(name))) => (namespace, name),
            _ => return Err(SyntaxError::new(name_offset, Expected::AttributeName)),
        };
        self.skip_whitespace();

        let matcher = if self.check(TokenKind::AttributeOperator) {
            let token = self.advance();
            let operator = AttributeOperator::from_symbol(&token.text)
                .ok_or_else(|| SyntaxError::new(token.offset, Expected::Token("]")))?;
            self.skip_whitespace();
            let value = self.parse_attribute_value()?;
            self.skip_whitespace();
            Some(AttributeMatcher { operator, value })
        } else {
            None
        };

        self.expect(TokenKind::AttributeEnd, "]")?;

        Ok(AttributeSelector {
            name,
            namespace,
            matcher,
        })
    }

    fn parse_attribute_value(&mut self) -> Result<String, SyntaxError> {
        match self.peek().kind {
            TokenKind::Identifier => Ok(unescape_identifier(&self.advance().text)),
            TokenKind::Number => Ok(self.advance().text),
            TokenKind::SingleQuoteStart | TokenKind::DoubleQuoteStart => self.parse_string(),
            _ => Err(self.error(Expected::AttributeValue)),
        }
    }

    /// Parse a quoted string, decoding escaped characters.
    fn parse_string(&mut self) -> Result<String, SyntaxError> {
        let open = self.advance();
        let close = if open.kind == TokenKind::SingleQuoteStart {
            TokenKind::SingleQuoteEnd
        } else {
            TokenKind::DoubleQuoteEnd
        };

        let mut value = String::new();
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::StringChars => value.push_str(&token.text),
                TokenKind::EscapedChar => value.push_str(&token.text[1..]),
                kind if kind == close => return Ok(value),
                _ => {
                    let quote = if close == TokenKind::SingleQuoteEnd { "'" } else { "\"" };
                    return Err(SyntaxError::new(token.offset, Expected::Token(quote)));
                }
            }
        }
    }

    // =========================================================================
    // Pseudo-classes
    // =========================================================================

    fn parse_pseudo_class(&mut self) -> Result<PseudoClass, SyntaxError> {
        let token = self.advance();
        let name = unescape_identifier(&token.text[1..]).to_ascii_lowercase();
        let has_arguments = self.check(TokenKind::ParenthesesStart);

        let pseudo = match (name.as_str(), has_arguments) {
            ("first-child", false) => PseudoClass::FirstChild,
            ("last-child", false) => PseudoClass::LastChild,
            ("only-child", false) => PseudoClass::OnlyChild,
            ("first-of-type", false) => PseudoClass::FirstOfType,
            ("last-of-type", false) => PseudoClass::LastOfType,
            ("only-of-type", false) => PseudoClass::OnlyOfType,
            ("empty", false) => PseudoClass::Empty,
            ("root", false) => PseudoClass::Root,
            ("checked", false) => PseudoClass::Checked,
            ("disabled", false) => PseudoClass::Disabled,
            ("enabled", false) => PseudoClass::Enabled,
            ("nth-child", true) => PseudoClass::NthChild(self.parse_nth_argument()?),
            ("nth-last-child", true) => PseudoClass::NthLastChild(self.parse_nth_argument()?),
            ("nth-of-type", true) => PseudoClass::NthOfType(self.parse_nth_argument()?),
            ("nth-last-of-type", true) => PseudoClass::NthLastOfType(self.parse_nth_argument()?),
            ("not", true) => PseudoClass::Not(self.parse_nested_list(&token)?),
            ("has", true) => PseudoClass::Has(self.parse_nested_list(&token)?),
            ("contains", true) => PseudoClass::Contains(self.parse_text_argument()?),
            (
                "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" | "not"
                | "has" | "contains",
                false,
            ) => {
                return Err(SyntaxError::new(token.end(), Expected::Argument(name)));
            }
            _ => {
                let written = if has_arguments {
                    format!(":{name}()")
                } else {
                    format!(":{name}")
                };
                return Err(SyntaxError::new(token.offset, Expected::Unsupported(written)));
            }
        };

        trace!(?pseudo, offset = token.offset, "pseudo-class");
        Ok(pseudo)
    }

    /// Parse `(an+b)` by joining the argument tokens back into text.
    fn parse_nth_argument(&mut self) -> Result<Nth, SyntaxError> {
        let open = self.advance(); // consume `(`
        let mut text = String::new();

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::ParenthesesEnd => break,
                TokenKind::Number
                | TokenKind::Identifier
                | TokenKind::Combinator
                | TokenKind::Whitespace => {
                    text.push_str(&token.text);
                    self.advance();
                }
                _ => return Err(self.error(Expected::NthExpression)),
            }
        }

        let nth = Nth::parse(&text)
            .ok_or_else(|| SyntaxError::new(open.end(), Expected::NthExpression))?;
        self.advance(); // consume `)`
        Ok(nth)
    }

    /// Parse a parenthesized selector list, one nesting level deeper.
    fn parse_nested_list(&mut self, pseudo: &Token) -> Result<SelectorList, SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::new(
                pseudo.offset,
                Expected::TooDeep {
                    limit: self.max_depth,
                },
            ));
        }

        self.advance(); // consume `(`
        self.depth += 1;
        let list = self.parse_selector_list(TokenKind::ParenthesesEnd)?;
        self.depth -= 1;
        self.advance(); // consume `)`
        Ok(list)
    }

    /// Parse `(text)` where text is a string or a bare identifier/number.
    fn parse_text_argument(&mut self) -> Result<String, SyntaxError> {
        self.advance(); // consume `(`
        self.skip_whitespace();

        let value = match self.peek().kind {
            TokenKind::SingleQuoteStart | TokenKind::DoubleQuoteStart => self.parse_string()?,
            TokenKind::Identifier => unescape_identifier(&self.advance().text),
            TokenKind::Number => self.advance().text,
            _ => return Err(self.error(Expected::AttributeValue)),
        };

        self.skip_whitespace();
        self.expect(TokenKind::ParenthesesEnd, ")")?;
        Ok(value)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn starts_compound(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Identifier
                | TokenKind::Universal
                | TokenKind::NamespaceSeparator
                | TokenKind::ClassSelector
                | TokenKind::IdSelector
                | TokenKind::AttributeStart
                | TokenKind::PseudoClass
                | TokenKind::PseudoElement
        )
    }

    /// Skip whitespace tokens, returning whether any were skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.check(TokenKind::Whitespace) {
            self.advance();
        }
        self.pos > start
    }

    fn expect(&mut self, kind: TokenKind, symbol: &'static str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(Expected::Token(symbol)))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token. Stays on `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, expected: Expected) -> SyntaxError {
        SyntaxError::new(self.peek().offset, expected)
    }
}
