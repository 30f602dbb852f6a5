//! XPath generator.
//!
//! Walks the selector AST and emits an XPath 1.0 location path. Each
//! compound selector becomes one `*` step with one predicate per simple
//! selector; combinators pick the axis of the next step. Inside `:not()` a
//! complex selector is turned around into a boolean condition on the current
//! element, reaching back over the reverse axes.

use csspath_parser::{
    AttributeOperator, AttributeSelector, Combinator, Compound, Expected, NamespacePrefix,
    PseudoClass, Selector, SelectorList, SimpleSelector, SyntaxError,
};

use crate::literal::{is_ncname, quote_literal};
use crate::namespaces::{
    NamespaceResolver, UnknownNamespacePrefixError, XML_NAMESPACE, XML_PREFIX,
};
use crate::{Error, Scope};

/// Emits XPath for selector ASTs against one namespace context.
pub struct XPathGenerator<'a> {
    namespaces: &'a dyn NamespaceResolver,
}

impl<'a> XPathGenerator<'a> {
    pub fn new(namespaces: &'a dyn NamespaceResolver) -> Self {
        Self { namespaces }
    }

    /// Generate a `|`-joined union with one branch per selector.
    pub fn generate(&self, list: &SelectorList, scope: Scope) -> Result<String, Error> {
        let branches = list
            .selectors
            .iter()
            .map(|selector| self.path(selector, scope.axis()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(branches.join(" | "))
    }

    // =========================================================================
    // Location paths
    // =========================================================================

    /// The location path selecting `selector`'s subject, starting on `axis`.
    fn path(&self, selector: &Selector, axis: &str) -> Result<String, Error> {
        let mut path = format!("{axis}*{}", self.predicates(&selector.first)?);
        for (kind, compound) in &selector.rest {
            path.push_str(match kind {
                Combinator::Descendant => "/descendant::*",
                Combinator::Child => "/*",
                Combinator::Adjacent => "/following-sibling::*[1]",
                Combinator::GeneralSibling => "/following-sibling::*",
            });
            path.push_str(&self.predicates(compound)?);
        }
        Ok(path)
    }

    fn predicates(&self, compound: &Compound) -> Result<String, Error> {
        Ok(self
            .conditions(compound)?
            .iter()
            .map(|condition| format!("[{condition}]"))
            .collect())
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// One boolean expression per simple selector that restricts anything.
    fn conditions(&self, compound: &Compound) -> Result<Vec<String>, Error> {
        let mut conditions = Vec::new();

        for simple in &compound.selectors {
            let condition = match simple {
                SimpleSelector::Type { name, namespace } => {
                    Some(self.type_condition(name, namespace.as_ref())?)
                }
                SimpleSelector::Universal { namespace } => {
                    self.universal_condition(namespace.as_ref())?
                }
                SimpleSelector::Attribute(attribute) => Some(self.attribute_condition(attribute)?),
                SimpleSelector::Class(name) => Some(format!(
                    "contains(concat(' ', normalize-space(@class), ' '), {})",
                    quote_literal(&format!(" {name} "))
                )),
                SimpleSelector::Id(id) => Some(format!("@id={}", quote_literal(id))),
                SimpleSelector::PseudoClass(pseudo) => self.pseudo_condition(pseudo, compound)?,
            };
            conditions.extend(condition);
        }

        Ok(conditions)
    }

    /// A complex selector as a condition on the current element.
    ///
    /// Built from the leftmost compound outwards: each combinator wraps what
    /// is known so far in the reverse axis leading back to it.
    fn condition(&self, selector: &Selector) -> Result<String, Error> {
        let mut inner = and_join(self.conditions(&selector.first)?);
        for (kind, compound) in &selector.rest {
            let axis = match kind {
                Combinator::Descendant => "ancestor::*",
                Combinator::Child => "parent::*",
                Combinator::Adjacent => "preceding-sibling::*[1]",
                Combinator::GeneralSibling => "preceding-sibling::*",
            };
            let mut parts = self.conditions(compound)?;
            parts.push(if inner == TRUE {
                axis.to_string()
            } else {
                format!("{axis}[{inner}]")
            });
            inner = and_join(parts);
        }
        Ok(inner)
    }

    fn list_condition(&self, list: &SelectorList) -> Result<String, Error> {
        let parts = list
            .selectors
            .iter()
            .map(|selector| self.condition(selector))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(" or "))
    }

    fn type_condition(
        &self,
        name: &str,
        namespace: Option<&NamespacePrefix>,
    ) -> Result<String, Error> {
        let local = quote_literal(name);
        let condition = match namespace {
            None => match self.namespaces.default_namespace() {
                Some(uri) if !uri.is_empty() => format!(
                    "local-name()={local} and namespace-uri()={}",
                    quote_literal(uri)
                ),
                _ => format!("name()={local}"),
            },
            Some(NamespacePrefix::Any) => format!("local-name()={local}"),
            Some(NamespacePrefix::NoNamespace) => {
                format!("local-name()={local} and namespace-uri()=''")
            }
            Some(NamespacePrefix::Named(prefix)) => format!(
                "local-name()={local} and namespace-uri()={}",
                quote_literal(self.resolve(prefix)?)
            ),
        };
        Ok(condition)
    }

    fn universal_condition(
        &self,
        namespace: Option<&NamespacePrefix>,
    ) -> Result<Option<String>, Error> {
        let uri = match namespace {
            None | Some(NamespacePrefix::Any) => return Ok(None),
            Some(NamespacePrefix::NoNamespace) => "",
            Some(NamespacePrefix::Named(prefix)) => self.resolve(prefix)?,
        };
        Ok(Some(format!("namespace-uri()={}", quote_literal(uri))))
    }

    fn attribute_condition(&self, attribute: &AttributeSelector) -> Result<String, Error> {
        let name = &attribute.name;
        let node = match &attribute.namespace {
            None | Some(NamespacePrefix::NoNamespace) if is_ncname(name) => format!("@{name}"),
            None | Some(NamespacePrefix::NoNamespace) => {
                format!("@*[name()={}]", quote_literal(name))
            }
            Some(NamespacePrefix::Any) => format!("@*[local-name()={}]", quote_literal(name)),
            Some(NamespacePrefix::Named(prefix)) => format!(
                "@*[local-name()={} and namespace-uri()={}]",
                quote_literal(name),
                quote_literal(self.resolve(prefix)?)
            ),
        };

        let Some(matcher) = &attribute.matcher else {
            return Ok(node);
        };
        let value = matcher.value.as_str();
        let literal = quote_literal(value);

        let condition = match matcher.operator {
            AttributeOperator::Equals => format!("{node}={literal}"),
            AttributeOperator::Includes
                if value.is_empty() || value.contains(char::is_whitespace) =>
            {
                FALSE.to_string()
            }
            AttributeOperator::Includes => format!(
                "contains(concat(' ', normalize-space({node}), ' '), {})",
                quote_literal(&format!(" {value} "))
            ),
            AttributeOperator::DashMatch => format!(
                "({node}={literal} or starts-with({node}, {}))",
                quote_literal(&format!("{value}-"))
            ),
            _ if value.is_empty() => FALSE.to_string(),
            AttributeOperator::Prefix => format!("starts-with({node}, {literal})"),
            AttributeOperator::Suffix => {
                let tail = value.chars().count() - 1;
                let start = if tail == 0 {
                    format!("string-length({node})")
                } else {
                    format!("string-length({node}) - {tail}")
                };
                format!("substring({node}, {start})={literal}")
            }
            AttributeOperator::Substring => format!("contains({node}, {literal})"),
        };
        Ok(condition)
    }

    // =========================================================================
    // Pseudo-classes
    // =========================================================================

    /// `None` when the pseudo-class matches every element.
    fn pseudo_condition(
        &self,
        pseudo: &PseudoClass,
        compound: &Compound,
    ) -> Result<Option<String>, Error> {
        let condition = match pseudo {
            PseudoClass::FirstChild => "not(preceding-sibling::*)".to_string(),
            PseudoClass::LastChild => "not(following-sibling::*)".to_string(),
            PseudoClass::OnlyChild => {
                "not(preceding-sibling::*) and not(following-sibling::*)".to_string()
            }
            PseudoClass::FirstOfType => {
                format!("not(preceding-sibling::*[{}])", self.sibling_type(pseudo, compound)?)
            }
            PseudoClass::LastOfType => {
                format!("not(following-sibling::*[{}])", self.sibling_type(pseudo, compound)?)
            }
            PseudoClass::OnlyOfType => {
                let test = self.sibling_type(pseudo, compound)?;
                format!("not(preceding-sibling::*[{test}]) and not(following-sibling::*[{test}])")
            }
            PseudoClass::Empty => "not(*) and not(text())".to_string(),
            PseudoClass::Root => "not(parent::*)".to_string(),
            PseudoClass::Checked => "@checked".to_string(),
            PseudoClass::Disabled => "@disabled".to_string(),
            PseudoClass::Enabled => "not(@disabled)".to_string(),
            PseudoClass::NthChild(nth) => {
                return Ok(nth_condition("preceding-sibling::*", nth.a, nth.b));
            }
            PseudoClass::NthLastChild(nth) => {
                return Ok(nth_condition("following-sibling::*", nth.a, nth.b));
            }
            PseudoClass::NthOfType(nth) => {
                let test = self.sibling_type(pseudo, compound)?;
                return Ok(nth_condition(&format!("preceding-sibling::*[{test}]"), nth.a, nth.b));
            }
            PseudoClass::NthLastOfType(nth) => {
                let test = self.sibling_type(pseudo, compound)?;
                return Ok(nth_condition(&format!("following-sibling::*[{test}]"), nth.a, nth.b));
            }
            PseudoClass::Not(list) => format!("not({})", self.list_condition(list)?),
            PseudoClass::Has(list) => {
                let paths = list
                    .selectors
                    .iter()
                    .map(|selector| self.path(selector, Scope::Descendants.axis()))
                    .collect::<Result<Vec<_>, _>>()?;
                if paths.len() == 1 {
                    paths.join("")
                } else {
                    format!("({})", paths.join(" | "))
                }
            }
            PseudoClass::Contains(text) => format!("contains(., {})", quote_literal(text)),
        };
        Ok(Some(condition))
    }

    /// The type test `*-of-type` pseudo-classes compare siblings against.
    fn sibling_type(&self, pseudo: &PseudoClass, compound: &Compound) -> Result<String, Error> {
        match compound.type_selector() {
            Some((name, namespace)) => self.type_condition(name, namespace),
            None => Err(Error::Syntax(SyntaxError::new(
                compound.offset,
                Expected::Unsupported(format!("{} without a type selector", of_type_name(pseudo))),
            ))),
        }
    }

    fn resolve(&self, prefix: &str) -> Result<&'a str, Error> {
        if prefix == XML_PREFIX {
            return Ok(XML_NAMESPACE);
        }
        self.namespaces.resolve_namespace(prefix).ok_or_else(|| {
            Error::UnknownNamespacePrefix(UnknownNamespacePrefixError {
                prefix: prefix.to_string(),
            })
        })
    }
}

const TRUE: &str = "true()";
const FALSE: &str = "false()";

fn and_join(parts: Vec<String>) -> String {
    if parts.is_empty() {
        TRUE.to_string()
    } else {
        parts.join(" and ")
    }
}

/// Condition for "1-based position among `axis` siblings matches `an+b`".
///
/// The position is `count(axis) + 1`, so with `k = b - 1` the element matches
/// when `count - k` is a non-negative multiple of `a` (for `a > 0`), a
/// non-positive one (for `a < 0`), or zero (for `a = 0`).
fn nth_condition(axis: &str, a: i32, b: i32) -> Option<String> {
    let count = format!("count({axis})");
    let a = i64::from(a);
    let k = i64::from(b) - 1;

    if a == 0 {
        return Some(if k < 0 {
            FALSE.to_string()
        } else {
            format!("{count}={k}")
        });
    }

    let mut parts = Vec::new();
    if a > 0 {
        if k > 0 {
            parts.push(format!("{count}>={k}"));
        }
        if a != 1 {
            let shifted = match k {
                0 => count.clone(),
                k if k > 0 => format!("({count} - {k})"),
                k => format!("({count} + {})", -k),
            };
            parts.push(format!("{shifted} mod {a}=0"));
        }
    } else {
        if k < 0 {
            return Some(FALSE.to_string());
        }
        parts.push(format!("{count}<={k}"));
        if a != -1 {
            parts.push(format!("({k} - {count}) mod {}=0", -a));
        }
    }

    (!parts.is_empty()).then(|| parts.join(" and "))
}

fn of_type_name(pseudo: &PseudoClass) -> &'static str {
    match pseudo {
        PseudoClass::FirstOfType => ":first-of-type",
        PseudoClass::LastOfType => ":last-of-type",
        PseudoClass::OnlyOfType => ":only-of-type",
        PseudoClass::NthOfType(_) => ":nth-of-type()",
        PseudoClass::NthLastOfType(_) => ":nth-last-of-type()",
        _ => "pseudo-class",
    }
}
