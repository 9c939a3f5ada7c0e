//! Navigation label resolution.
//!
//! Sidebar items carry a literal title plus an optional translation key.
//! Resolution tries the precise key and falls back to the literal title,
//! so a missing or unregistered key can never break navigation rendering.

/// A navigation item with a literal title and an optional lookup key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavItem {
    /// Literal display title, used when no translation applies.
    pub title: String,
    /// Optional catalog key for the translated title.
    #[cfg_attr(feature = "serde", serde(default))]
    pub title_key: Option<String>,
}

impl NavItem {
    /// Creates an item with no translation key.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            title_key: None,
        }
    }

    /// Sets the translation key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.title_key = Some(key.into());
        self
    }
}

/// Capability an active translation catalog exposes to label resolution.
pub trait Translator {
    /// Returns whether the key is registered in the active catalog.
    fn has(&self, key: &str) -> bool;

    /// Returns the translated string for a registered key.
    ///
    /// Implementations may panic or emit placeholders for unregistered
    /// keys, which is why [`resolve_label`] gates every call behind
    /// [`Translator::has`].
    fn translate(&self, key: &str) -> String;
}

/// Resolves the display label for a navigation item.
///
/// Returns the translated string when the item carries a non-empty key
/// that the translator knows; otherwise the literal title. Never fails,
/// and never calls [`Translator::translate`] for an unregistered key.
pub fn resolve_label(item: &NavItem, translator: &impl Translator) -> String {
    match item.title_key.as_deref() {
        Some(key) if !key.is_empty() && translator.has(key) => translator.translate(key),
        _ => item.title.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct MapTranslator {
        catalog: HashMap<String, String>,
        calls: Cell<usize>,
    }

    impl MapTranslator {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                catalog: entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl Translator for MapTranslator {
        fn has(&self, key: &str) -> bool {
            self.catalog.contains_key(key)
        }

        fn translate(&self, key: &str) -> String {
            self.calls.set(self.calls.get() + 1);
            self.catalog
                .get(key)
                .cloned()
                .unwrap_or_else(|| panic!("translate called for unregistered key {key}"))
        }
    }

    struct PanickingTranslator;

    impl Translator for PanickingTranslator {
        fn has(&self, _key: &str) -> bool {
            false
        }

        fn translate(&self, key: &str) -> String {
            panic!("translate must not be called, got {key}");
        }
    }

    #[test]
    fn registered_key_resolves_translation_with_one_call() {
        let translator = MapTranslator::new(&[("modules.org.title", "Organisation")]);
        let item = NavItem::new("Organization").with_key("modules.org.title");

        assert_eq!(resolve_label(&item, &translator), "Organisation");
        assert_eq!(translator.calls.get(), 1);
    }

    #[test]
    fn unregistered_key_falls_back_without_calling_translate() {
        let translator = PanickingTranslator;
        let item = NavItem::new("Organization").with_key("modules.org.title");

        assert_eq!(resolve_label(&item, &translator), "Organization");
    }

    #[test]
    fn empty_key_falls_back_regardless_of_catalog() {
        let translator = MapTranslator::new(&[("", "never")]);
        let item = NavItem::new("Organization").with_key("");

        assert_eq!(resolve_label(&item, &translator), "Organization");
        assert_eq!(translator.calls.get(), 0);
    }

    #[test]
    fn missing_key_uses_title() {
        let translator = MapTranslator::new(&[("modules.org.title", "Organisation")]);
        let item = NavItem::new("Organization");

        assert_eq!(resolve_label(&item, &translator), "Organization");
        assert_eq!(translator.calls.get(), 0);
    }
}
