//! Custom element definitions keyed by public element name.

use eo_core::OverlayError;
use eo_core::OverlayResult;
use std::collections::BTreeMap;

const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// A registered component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDefinition {
    pub name: String,
    pub component: &'static str,
}

/// Page-wide registry of custom element names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomElementRegistry {
    definitions: BTreeMap<String, ElementDefinition>,
}

impl CustomElementRegistry {
    /// Defines `name`. Redefining an existing name is an error, matching the
    /// platform registry; callers wanting idempotence check `get` first.
    pub fn define(&mut self, name: &str, component: &'static str) -> OverlayResult<()> {
        if !is_valid_custom_element_name(name) {
            return Err(OverlayError::new(
                "dom.registry.invalid_name",
                format!("`{name}` is not a valid custom element name"),
            ));
        }

        if self.definitions.contains_key(name) {
            return Err(OverlayError::new(
                "dom.registry.already_defined",
                format!("`{name}` has already been defined"),
            ));
        }

        self.definitions.insert(
            name.to_owned(),
            ElementDefinition {
                name: name.to_owned(),
                component,
            },
        );
        tracing::debug!(name, component, "custom element defined");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ElementDefinition> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_lower = chars.next().is_some_and(|ch| ch.is_ascii_lowercase());
    starts_lower
        && name.contains('-')
        && !RESERVED_NAMES.contains(&name)
        && name.chars().all(|ch| {
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '-' | '.' | '_')
        })
}

#[cfg(test)]
mod tests {
    use super::CustomElementRegistry;

    #[test]
    fn defines_each_name_once() {
        let mut registry = CustomElementRegistry::default();
        assert!(registry.define("x-panel", "Panel").is_ok());
        let error = match registry.define("x-panel", "Other") {
            Ok(()) => panic!("second definition must fail"),
            Err(error) => error,
        };
        assert_eq!(error.code, "dom.registry.already_defined");
        assert_eq!(registry.get("x-panel").map(|def| def.component), Some("Panel"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_invalid_names() {
        let mut registry = CustomElementRegistry::default();
        assert!(registry.define("panel", "Panel").is_err());
        assert!(registry.define("X-panel", "Panel").is_err());
        assert!(registry.define("font-face", "Panel").is_err());
        assert!(registry.is_empty());
    }
}
