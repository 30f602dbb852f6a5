use serde::Serialize;

/// Token classification for CSS selector source.
///
/// The kind never carries data: the matched text lives on [`Token::text`],
/// so escapes and quoting stay visible to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Layout
    Whitespace,

    // Names
    Identifier,
    Number,
    Universal,          // *
    NamespaceSeparator, // |

    // Prefixed names
    ClassSelector, // .name
    IdSelector,    // #name
    PseudoClass,   // :name
    PseudoElement, // ::name

    // Combinators and lists
    Combinator, // > + ~
    Separator,  // ,

    // Attribute brackets
    AttributeStart,    // [
    AttributeOperator, // = ~= |= ^= $= *=
    AttributeEnd,      // ]

    // Pseudo-class arguments
    ParenthesesStart,
    ParenthesesEnd,

    // Strings
    SingleQuoteStart,
    SingleQuoteEnd,
    DoubleQuoteStart,
    DoubleQuoteEnd,
    StringChars,
    EscapedChar,

    // Comments
    CommentStart,
    CommentText,
    CommentEnd,

    // End of input
    Eof,
}

/// A token produced by a [`Status`](crate::Status).
///
/// `offset` is the byte offset of `text` in the scanned source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    /// Length of the matched text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Whether the token only affects layout (whitespace and comments).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace
                | TokenKind::CommentStart
                | TokenKind::CommentText
                | TokenKind::CommentEnd
        )
    }
}
