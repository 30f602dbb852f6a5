//! csspath Parser
//!
//! Parses the token stream of a CSS selector into a [`SelectorList`] AST.
//! Handles selector lists, combinators, compound selectors, namespace
//! prefixes, attribute matchers and the supported pseudo-classes, including
//! the recursive `:not()` and `:has()` arguments.

pub mod ast;
pub mod nth;
pub mod parser;

use std::fmt;

use csspath_lexer::LexError;

pub use ast::{
    AttributeMatcher, AttributeOperator, AttributeSelector, Combinator, Compound,
    NamespacePrefix, PseudoClass, Selector, SelectorList, SimpleSelector,
};
pub use nth::Nth;
pub use parser::{Parser, DEFAULT_MAX_DEPTH};

/// The token stream does not match the selector grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error at offset {offset}: expected {expected}")]
pub struct SyntaxError {
    pub offset: usize,
    pub expected: Expected,
}

impl SyntaxError {
    pub fn new(offset: usize, expected: Expected) -> Self {
        Self { offset, expected }
    }
}

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Selector,
    ElementName,
    AttributeName,
    AttributeValue,
    /// A specific delimiter such as `]` or `)`.
    Token(&'static str),
    EndOfInput,
    NthExpression,
    /// The argument list of a functional pseudo-class.
    Argument(String),
    /// A pseudo-class or pseudo-element this compiler does not translate.
    Unsupported(String),
    TooDeep { limit: usize },
    TypeSelectorFirst,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Selector => f.write_str("a selector"),
            Expected::ElementName => f.write_str("an element name or '*'"),
            Expected::AttributeName => f.write_str("an attribute name"),
            Expected::AttributeValue => f.write_str("an identifier or string"),
            Expected::Token(token) => write!(f, "'{token}'"),
            Expected::EndOfInput => f.write_str("',' or end of input"),
            Expected::NthExpression => f.write_str("an an+b expression"),
            Expected::Argument(name) => write!(f, "an argument list for ':{name}'"),
            Expected::Unsupported(name) => {
                write!(f, "a supported selector, found unsupported '{name}'")
            }
            Expected::TooDeep { limit } => {
                write!(f, "at most {limit} nested selector groups")
            }
            Expected::TypeSelectorFirst => {
                f.write_str("type selector at the start of a compound selector")
            }
        }
    }
}

/// Error from [`Parser::parse`]: the source either fails to scan or to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.offset,
            ParseError::Syntax(e) => e.offset,
        }
    }
}
