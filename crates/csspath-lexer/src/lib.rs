//! csspath Lexer
//!
//! Tokenizes CSS selector text into a stream of tokens.
//! Scanning is driven by a stack of lexer modes ([`Status`]): plain selector
//! text, attribute brackets, pseudo-class arguments, quoted strings and
//! comments each recognize their own tokens.
//!
//! # Example
//!
//! ```
//! use csspath_lexer::{Scanner, TokenKind};
//!
//! let tokens = Scanner::tokenize("div.item").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! assert_eq!(tokens[1].kind, TokenKind::ClassSelector);
//! assert_eq!(tokens[2].kind, TokenKind::Eof);
//! ```

mod chars;
pub mod scanner;
pub mod status;
pub mod token;

pub use chars::unescape_identifier;
pub use scanner::Scanner;
pub use status::Status;
pub use token::{Token, TokenKind};

/// Lexer error with the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexer error at offset {offset}: {reason}")]
pub struct LexError {
    pub offset: usize,
    pub reason: LexErrorReason,
}

/// Why the scanner stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorReason {
    /// The active status has no token for the character at the offset.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// Input ended inside a nested status; the offset is where it opened.
    #[error("unterminated {0}")]
    Unterminated(Status),

    /// An end token arrived with only the default status on the stack.
    #[error("unbalanced '{0}'")]
    UnbalancedEnd(String),
}
