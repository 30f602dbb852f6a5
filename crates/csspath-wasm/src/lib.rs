//! WASM bindings for the csspath compiler.
//!
//! Exposes `compile()`, `tokenize()`, `check()` and `version()` to
//! JavaScript via wasm-bindgen. Compilation errors are thrown as JS errors.

use std::collections::BTreeMap;

use csspath_codegen::Namespaces;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Outcome of [`check`]. Unknown namespace prefixes count as valid.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct CheckResult {
    ok: bool,
    message: Option<String>,
    offset: Option<usize>,
}

/// Compile a CSS selector to an XPath expression.
///
/// `namespaces` is an optional plain object mapping prefixes to URIs; the
/// empty prefix sets the default namespace. Throws on invalid selectors,
/// unknown prefixes and attempts to bind `xml`.
#[wasm_bindgen]
pub fn compile(selector: &str, namespaces: JsValue) -> Result<String, JsError> {
    let bindings = if namespaces.is_undefined() || namespaces.is_null() {
        BTreeMap::new()
    } else {
        serde_wasm_bindgen::from_value(namespaces).map_err(|e| JsError::new(&e.to_string()))?
    };
    compile_native(selector, bindings).map_err(|e| JsError::new(&e))
}

/// Scan a selector into `[{ kind, text, offset }]`.
#[wasm_bindgen]
pub fn tokenize(selector: &str) -> Result<JsValue, JsError> {
    let tokens =
        csspath_lexer::Scanner::tokenize(selector).map_err(|e| JsError::new(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsError::new(&e.to_string()))
}

/// Validate a selector without throwing.
///
/// Returns `{ ok: boolean, message: string | null, offset: number | null }`.
#[wasm_bindgen]
pub fn check(selector: &str) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_missing_as_null(true);
    check_native(selector)
        .serialize(&serializer)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn check_native(selector: &str) -> CheckResult {
    match csspath_codegen::compile(selector, &Namespaces::new()) {
        Ok(_) | Err(csspath_codegen::Error::UnknownNamespacePrefix(_)) => CheckResult {
            ok: true,
            message: None,
            offset: None,
        },
        Err(e) => CheckResult {
            ok: false,
            message: Some(e.to_string()),
            offset: e.offset(),
        },
    }
}

fn compile_native(selector: &str, bindings: BTreeMap<String, String>) -> Result<String, String> {
    let namespaces = Namespaces::with(bindings).map_err(|e| e.to_string())?;
    csspath_codegen::compile(selector, &namespaces).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Native tests (non-WASM): verify the compile pipeline works
    // =========================================================================

    fn bindings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .collect()
    }

    #[test]
    fn test_compile_without_namespaces() {
        assert_eq!(
            compile_native("a#top", BTreeMap::new()).unwrap(),
            "descendant::*[name()='a'][@id='top']"
        );
    }

    #[test]
    fn test_compile_with_namespaces() {
        let xpath = compile_native("svg|circle", bindings(&[("svg", "urn:svg")])).unwrap();
        assert_eq!(
            xpath,
            "descendant::*[local-name()='circle' and namespace-uri()='urn:svg']"
        );
    }

    #[test]
    fn test_empty_prefix_is_default_namespace() {
        let xpath = compile_native("p", bindings(&[("", "urn:d")])).unwrap();
        assert_eq!(xpath, "descendant::*[local-name()='p' and namespace-uri()='urn:d']");
    }

    #[test]
    fn test_reserved_prefix_error() {
        let err = compile_native("a", bindings(&[("xml", "urn:x")])).unwrap_err();
        assert_eq!(err, "Can not register reserved namespace prefix \"xml\"");
    }

    #[test]
    fn test_syntax_error_message() {
        let err = compile_native("a >", BTreeMap::new()).unwrap_err();
        assert!(err.starts_with("Syntax error at offset 3"), "{err}");
    }

    #[test]
    fn test_check_valid_selectors() {
        let valid = CheckResult {
            ok: true,
            message: None,
            offset: None,
        };
        assert_eq!(check_native("ul > li:nth-child(odd)"), valid);
        assert_eq!(check_native("svg|rect"), valid);
    }

    #[test]
    fn test_check_reports_offset() {
        let result = check_native("a >");
        assert!(!result.ok);
        assert_eq!(result.offset, Some(3));
        assert!(result.message.unwrap().starts_with("Syntax error at offset 3"));

        let result = check_native(r#"[x="\26"]"#);
        assert_eq!(result.offset, Some(4));
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }

    #[test]
    fn test_multiple_compiles() {
        let first = compile_native("x|a", bindings(&[("x", "urn:one")])).unwrap();
        let second = compile_native("x|a", bindings(&[("x", "urn:two")])).unwrap();
        assert!(first.contains("urn:one"));
        assert!(second.contains("urn:two"));
        assert!(!second.contains("urn:one"));
    }
}
