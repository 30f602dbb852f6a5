//! csspath Code Generator
//!
//! Compiles CSS3 selectors into XPath 1.0 expressions. The selector is
//! scanned, parsed into a [`SelectorList`] AST, and then emitted by the
//! [`xpath::XPathGenerator`] against a namespace context.
//!
//! ```text
//! &str → Scanner → Vec<Token> → Parser → SelectorList → XPathGenerator → String
//! ```
//!
//! ```
//! use csspath_codegen::{compile, Namespaces};
//!
//! let xpath = compile("ul > li.active", &Namespaces::new()).unwrap();
//! assert_eq!(
//!     xpath,
//!     "descendant::*[name()='ul']/*[name()='li']\
//!      [contains(concat(' ', normalize-space(@class), ' '), ' active ')]"
//! );
//! ```

pub mod literal;
pub mod namespaces;
pub mod xpath;

use csspath_lexer::LexError;
use csspath_parser::{ParseError, Parser, SelectorList, SyntaxError, DEFAULT_MAX_DEPTH};
use tracing::debug;

pub use namespaces::{
    NamespaceResolver, Namespaces, ReservedPrefixError, UnknownNamespacePrefixError,
    XML_NAMESPACE,
};
pub use xpath::XPathGenerator;

/// Where the generated expression starts looking, relative to the context node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `descendant::`, like jQuery's `find()`.
    #[default]
    Descendants,
    /// `descendant-or-self::`
    DescendantsOrSelf,
    /// Children of the context node only.
    Children,
}

impl Scope {
    /// The axis prefix of the first location step.
    pub fn axis(self) -> &'static str {
        match self {
            Scope::Descendants => "descendant::",
            Scope::DescendantsOrSelf => "descendant-or-self::",
            Scope::Children => "",
        }
    }
}

/// Knobs for [`compile_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub scope: Scope,
    /// Maximum nesting of `:not()` / `:has()` argument lists.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            scope: Scope::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything that can go wrong between selector text and XPath.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    ReservedPrefix(#[from] ReservedPrefixError),
    #[error(transparent)]
    UnknownNamespacePrefix(#[from] UnknownNamespacePrefixError),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Lex(e) => Error::Lex(e),
            ParseError::Syntax(e) => Error::Syntax(e),
        }
    }
}

impl Error {
    /// Byte offset into the selector, for errors that have a position.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lex(e) => Some(e.offset),
            Error::Syntax(e) => Some(e.offset),
            Error::ReservedPrefix(_) | Error::UnknownNamespacePrefix(_) => None,
        }
    }
}

/// Compile `selector` with the default options.
pub fn compile(selector: &str, namespaces: &dyn NamespaceResolver) -> Result<String, Error> {
    compile_with(selector, namespaces, CompileOptions::default())
}

pub fn compile_with(
    selector: &str,
    namespaces: &dyn NamespaceResolver,
    options: CompileOptions,
) -> Result<String, Error> {
    debug!(selector, ?options, "compiling selector");
    let list = Parser::parse_with_max_depth(selector, options.max_depth)?;
    let xpath = compile_list(&list, namespaces, options.scope)?;
    debug!(branches = list.len(), %xpath, "compiled selector");
    Ok(xpath)
}

/// Emit XPath for an already parsed selector list.
pub fn compile_list(
    list: &SelectorList,
    namespaces: &dyn NamespaceResolver,
    scope: Scope,
) -> Result<String, Error> {
    XPathGenerator::new(namespaces).generate(list, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csspath_lexer::{LexErrorReason, Status};
    use csspath_parser::Expected;
    use pretty_assertions::assert_eq;

    fn css(selector: &str) -> String {
        compile(selector, &Namespaces::new()).unwrap()
    }

    #[test]
    fn test_compile_simple() {
        assert_eq!(css("p"), "descendant::*[name()='p']");
    }

    #[test]
    fn test_scopes() {
        let ns = Namespaces::new();
        let with = |scope| {
            compile_with(
                "a > b, c",
                &ns,
                CompileOptions {
                    scope,
                    ..Default::default()
                },
            )
            .unwrap()
        };
        assert_eq!(
            with(Scope::Descendants),
            "descendant::*[name()='a']/*[name()='b'] | descendant::*[name()='c']"
        );
        assert_eq!(
            with(Scope::DescendantsOrSelf),
            "descendant-or-self::*[name()='a']/*[name()='b'] | descendant-or-self::*[name()='c']"
        );
        assert_eq!(
            with(Scope::Children),
            "*[name()='a']/*[name()='b'] | *[name()='c']"
        );
    }

    #[test]
    fn test_whitespace_around_combinators() {
        assert_eq!(css("div > p"), css("div>p"));
        assert_eq!(css("  div  p  "), css("div p"));
        assert_eq!(css("a ,b"), css("a, b"));
    }

    #[test]
    fn test_escaped_quote_in_attribute_value() {
        assert_eq!(
            css(r#"[data-x="a\"b"]"#),
            r#"descendant::*[@data-x='a"b']"#
        );
        assert_eq!(
            css(r#"[t="it's \"x\""]"#),
            r#"descendant::*[@t=concat('it', "'", 's "x"')]"#
        );
    }

    #[test]
    fn test_escaped_space_stays_in_names() {
        assert_eq!(
            css(r"p.a\ b"),
            "descendant::*[name()='p']\
             [contains(concat(' ', normalize-space(@class), ' '), ' a b ')]"
        );
        assert_eq!(css(r"#x\ y"), "descendant::*[@id='x y']");
        assert_eq!(css(r"#\31 23"), "descendant::*[@id='123']");
    }

    #[test]
    fn test_unknown_string_escape_is_lex_error() {
        let cases = [
            (r#"[x="\26 y"]"#, 4),
            (r"[x='a\nb']", 5),
            (r":contains('\t')", 11),
        ];
        for (source, offset) in cases {
            match compile(source, &Namespaces::new()).unwrap_err() {
                Error::Lex(e) => {
                    assert_eq!(e.offset, offset, "{source}");
                    assert_eq!(e.reason, LexErrorReason::UnexpectedCharacter('\\'));
                }
                other => panic!("expected lex error for {source}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_stray_closing_parenthesis_is_lex_error() {
        match compile("li:not(.a))", &Namespaces::new()).unwrap_err() {
            Error::Lex(e) => {
                assert_eq!(e.offset, 10);
                assert_eq!(e.reason, LexErrorReason::UnbalancedEnd(")".into()));
            }
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn test_long_combinator_chain() {
        let chain = format!("{}b", "a ".repeat(10_000));
        let xpath = css(&chain);
        assert!(xpath.ends_with("/descendant::*[name()='b']"));
        assert_eq!(xpath.matches("/descendant::*").count(), 10_000);

        let chain = format!("{}b", "a > ".repeat(10_000));
        let xpath = css(&format!("p:not({chain})"));
        assert!(xpath.starts_with("descendant::*[name()='p'][not(name()='b' and parent::*["));
        assert_eq!(xpath.matches("parent::*").count(), 10_000);
    }

    #[test]
    fn test_comments_are_ignored() {
        assert_eq!(css("div /* c */ > p"), css("div > p"));
    }

    #[test]
    fn test_unterminated_attribute_is_syntax_error() {
        let err = compile("[attr=", &Namespaces::new()).unwrap_err();
        assert_eq!(err, Error::Syntax(SyntaxError::new(6, Expected::Token("]"))));
        assert_eq!(err.offset(), Some(6));
    }

    #[test]
    fn test_unterminated_string_is_lex_error() {
        let err = compile("[a='x", &Namespaces::new()).unwrap_err();
        match err {
            Error::Lex(e) => {
                assert_eq!(e.offset, 3);
                assert_eq!(
                    e.reason,
                    LexErrorReason::Unterminated(Status::SingleQuoteString)
                );
            }
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_prefix_has_no_offset() {
        let err = compile("x|a", &Namespaces::new()).unwrap_err();
        assert_eq!(err.offset(), None);
        assert_eq!(err.to_string(), "Unknown namespace prefix \"x\"");
    }

    #[test]
    fn test_max_depth_option() {
        let options = CompileOptions {
            max_depth: 1,
            ..Default::default()
        };
        let ns = Namespaces::new();
        assert!(compile_with(":not(a)", &ns, options).is_ok());
        let err = compile_with(":not(:not(a))", &ns, options).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax(SyntaxError {
                expected: Expected::TooDeep { limit: 1 },
                ..
            })
        ));
    }

    #[test]
    fn test_hash_map_resolver() {
        let mut map = std::collections::HashMap::new();
        map.insert("svg".to_string(), "urn:svg".to_string());
        assert_eq!(
            compile("svg|g", &map).unwrap(),
            "descendant::*[local-name()='g' and namespace-uri()='urn:svg']"
        );
    }

    #[test]
    fn test_compile_from_many_threads() {
        let ns = Namespaces::with([("svg", "urn:svg")]).unwrap();
        let selectors = ["svg|rect", "li:nth-child(odd)", "a[href^=http]", "p:not(.x)"];
        let expected: Vec<String> = selectors
            .iter()
            .map(|s| compile(s, &ns).unwrap())
            .collect();

        let ns = &ns;
        let results: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = selectors
                .iter()
                .map(|s| scope.spawn(move || compile(s, ns).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results, expected);
    }
}
