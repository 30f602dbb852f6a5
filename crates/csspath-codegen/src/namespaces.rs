//! Namespace prefix resolution.
//!
//! The compiler turns `prefix|name` into a namespace-uri test, so it needs
//! to look prefixes up. [`NamespaceResolver`] is the seam; [`Namespaces`] is
//! the registry callers usually hand in. The `xml` prefix is bound to
//! [`XML_NAMESPACE`] everywhere and can not be rebound.

use std::collections::{BTreeMap, HashMap};

pub const XML_PREFIX: &str = "xml";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Pseudo-prefix under which the default namespace is registered.
pub const DEFAULT_PREFIX: &str = "#default";

/// Attempt to register the reserved `xml` prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Can not register reserved namespace prefix \"{prefix}\"")]
pub struct ReservedPrefixError {
    pub prefix: String,
}

/// A selector used a prefix the context does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown namespace prefix \"{prefix}\"")]
pub struct UnknownNamespacePrefixError {
    pub prefix: String,
}

/// Maps namespace prefixes to URIs for the compiler.
pub trait NamespaceResolver {
    /// The URI bound to `prefix`, if any.
    fn resolve_namespace(&self, prefix: &str) -> Option<&str>;

    /// Namespace applied to type selectors written without a prefix.
    fn default_namespace(&self) -> Option<&str> {
        self.resolve_namespace(DEFAULT_PREFIX)
    }
}

impl NamespaceResolver for HashMap<String, String> {
    fn resolve_namespace(&self, prefix: &str) -> Option<&str> {
        self.get(prefix).map(String::as_str)
    }
}

impl NamespaceResolver for BTreeMap<String, String> {
    fn resolve_namespace(&self, prefix: &str) -> Option<&str> {
        self.get(prefix).map(String::as_str)
    }
}

/// A prefix → URI registry with a protected `xml` prefix.
///
/// ```
/// use csspath_codegen::Namespaces;
///
/// let mut ns = Namespaces::new();
/// ns.register("svg", "http://www.w3.org/2000/svg").unwrap();
/// assert_eq!(ns.resolve("svg").unwrap(), "http://www.w3.org/2000/svg");
/// assert!(ns.register("xml", "urn:nope").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    prefixes: BTreeMap<String, String>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(prefix, uri)` pairs.
    pub fn with<I, P, U>(pairs: I) -> Result<Self, ReservedPrefixError>
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        let mut namespaces = Self::new();
        for (prefix, uri) in pairs {
            namespaces.register(prefix, uri)?;
        }
        Ok(namespaces)
    }

    /// Bind `prefix` to `uri`, replacing an earlier binding.
    ///
    /// The empty prefix and `#default` both set the default namespace.
    pub fn register(
        &mut self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<(), ReservedPrefixError> {
        let prefix = normalize(prefix.into());
        if Self::is_reserved_prefix(&prefix) {
            return Err(ReservedPrefixError { prefix });
        }
        self.prefixes.insert(prefix, uri.into());
        Ok(())
    }

    /// Set the namespace of unprefixed type selectors.
    pub fn set_default(&mut self, uri: impl Into<String>) {
        self.prefixes.insert(DEFAULT_PREFIX.to_string(), uri.into());
    }

    /// Remove a binding, returning its URI.
    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        self.prefixes.remove(normalize(prefix.to_string()).as_str())
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(normalize(prefix.to_string()).as_str())
    }

    /// Look up `prefix`.
    ///
    /// `xml` always resolves to [`XML_NAMESPACE`]. The default namespace
    /// (empty prefix or `#default`) resolves to `""` when none is set.
    pub fn resolve(&self, prefix: &str) -> Result<&str, UnknownNamespacePrefixError> {
        if prefix == XML_PREFIX {
            return Ok(XML_NAMESPACE);
        }
        let prefix = normalize(prefix.to_string());
        match self.prefixes.get(&prefix) {
            Some(uri) => Ok(uri.as_str()),
            None if prefix == DEFAULT_PREFIX => Ok(""),
            None => Err(UnknownNamespacePrefixError { prefix }),
        }
    }

    pub fn is_reserved_prefix(prefix: &str) -> bool {
        prefix == XML_PREFIX
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Registered bindings in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}

impl NamespaceResolver for Namespaces {
    fn resolve_namespace(&self, prefix: &str) -> Option<&str> {
        self.resolve(prefix).ok()
    }

    fn default_namespace(&self) -> Option<&str> {
        self.prefixes.get(DEFAULT_PREFIX).map(String::as_str)
    }
}

fn normalize(prefix: String) -> String {
    if prefix.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        prefix
    }
}
