//! Abstract Syntax Tree for CSS selectors.
//!
//! A selector list is a union of complex selectors; a complex selector is a
//! flat chain of compound selectors joined by combinators; a
//! compound selector is a non-empty run of simple selectors that all apply
//! to one element.

use crate::nth::Nth;

/// A comma-separated list of selectors (`a, b`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// A complex selector: compounds joined by combinators, read left to right.
///
/// `div > p span` is `first = div`, `rest = [(Child, p), (Descendant, span)]`.
/// The chain is kept flat so its length never turns into recursion depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub first: Compound,
    pub rest: Vec<(Combinator, Compound)>,
}

impl Selector {
    pub fn compound(compound: Compound) -> Self {
        Self {
            first: compound,
            rest: Vec::new(),
        }
    }

    /// The compound the selector matches, i.e. the one after the last combinator.
    pub fn subject(&self) -> &Compound {
        self.rest.last().map_or(&self.first, |(_, compound)| compound)
    }
}

/// How two compound selectors relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
    /// `+`
    Adjacent,
    /// `~`
    GeneralSibling,
}

impl Combinator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::Adjacent),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        }
    }
}

/// Simple selectors applying to a single element. Never empty.
///
/// Equality compares the selectors only; `offset` is source metadata.
#[derive(Debug, Clone)]
pub struct Compound {
    pub selectors: Vec<SimpleSelector>,
    /// Byte offset of the compound in the source.
    pub offset: usize,
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.selectors == other.selectors
    }
}

impl Eq for Compound {}

impl Compound {
    /// The type selector, if the compound starts with one.
    pub fn type_selector(&self) -> Option<(&str, Option<&NamespacePrefix>)> {
        match self.selectors.first() {
            Some(SimpleSelector::Type { name, namespace }) => {
                Some((name.as_str(), namespace.as_ref()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `div`, `svg|rect`
    Type {
        name: String,
        namespace: Option<NamespacePrefix>,
    },
    /// `*`, `svg|*`
    Universal { namespace: Option<NamespacePrefix> },
    /// `[name]`, `[name=value]`
    Attribute(AttributeSelector),
    /// `.name`
    Class(String),
    /// `#name`
    Id(String),
    /// `:name`, `:name(argument)`
    PseudoClass(PseudoClass),
}

/// The namespace part of a qualified name.
///
/// Absent (`None` on the owning selector) means no prefix was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespacePrefix {
    /// `*|name`: any namespace, or none.
    Any,
    /// `|name`: no namespace.
    NoNamespace,
    /// `prefix|name`
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub namespace: Option<NamespacePrefix>,
    pub matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatcher {
    pub operator: AttributeOperator,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `=`
    Equals,
    /// `~=`: whitespace-separated word
    Includes,
    /// `|=`: exact or followed by `-`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttributeOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(AttributeOperator::Equals),
            "~=" => Some(AttributeOperator::Includes),
            "|=" => Some(AttributeOperator::DashMatch),
            "^=" => Some(AttributeOperator::Prefix),
            "$=" => Some(AttributeOperator::Suffix),
            "*=" => Some(AttributeOperator::Substring),
            _ => None,
        }
    }
}

/// The supported pseudo-classes, with their parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Root,
    Checked,
    Disabled,
    Enabled,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Not(SelectorList),
    Has(SelectorList),
    Contains(String),
}
