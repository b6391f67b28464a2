//! Field definitions and language configuration
//!
//! Both are supplied by the surrounding record model and never mutated here.

use crate::node::ValueShape;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Widget type used when a definition names none
pub const DEFAULT_WIDGET_TYPE: &str = "text";

fn default_widget_type() -> String {
    DEFAULT_WIDGET_TYPE.to_string()
}

/// Where autocomplete suggestions come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AutocompleteSource {
    /// Parameterised SPARQL query
    ///
    /// `LANGUAGE` and `SEARCH_TERM` are substituted in `query`,
    /// `SEARCH_TERM` in `source`.
    Sparql {
        /// Query template
        query: String,
        /// Source (endpoint or document URL) template
        source: String,
    },
    /// Free-text entity lookup service
    FreeText,
}

/// Definition of one editable attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Attribute identifier in the record
    pub binding: String,
    /// Registry key of the widget variant
    #[serde(rename = "type", default = "default_widget_type")]
    pub widget_type: String,
    /// Declared value shape
    #[serde(default)]
    pub shape: ValueShape,
    /// Primary slot must hold a value
    #[serde(default)]
    pub required: bool,
    /// More than one value allowed
    #[serde(default)]
    pub multiple: bool,
    /// Values may be translated
    #[serde(default)]
    pub translatable: bool,
    /// Persist an explicit empty marker instead of omitting the attribute
    #[serde(default)]
    pub save_empty_value: bool,
    /// Input placeholder
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Label per language
    #[serde(default)]
    pub label: IndexMap<String, String>,
    /// Help text
    #[serde(default)]
    pub description: Option<String>,
    /// Suggestion source
    #[serde(default)]
    pub autocomplete: Option<AutocompleteSource>,
}

impl FieldDefinition {
    /// Create a single-valued, optional text field
    #[must_use]
    pub fn new(binding: impl Into<String>) -> Self {
        Self {
            binding: binding.into(),
            widget_type: default_widget_type(),
            shape: ValueShape::Literal,
            required: false,
            multiple: false,
            translatable: false,
            save_empty_value: false,
            placeholder: None,
            label: IndexMap::new(),
            description: None,
            autocomplete: None,
        }
    }

    /// With widget type
    #[inline]
    #[must_use]
    pub fn with_widget_type(mut self, widget_type: impl Into<String>) -> Self {
        self.widget_type = widget_type.into();
        self
    }

    /// With value shape
    #[inline]
    #[must_use]
    pub fn with_shape(mut self, shape: ValueShape) -> Self {
        self.shape = shape;
        self
    }

    /// Mark required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow multiple values
    #[inline]
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Allow translations
    #[inline]
    #[must_use]
    pub fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }

    /// Persist explicit empty markers
    #[inline]
    #[must_use]
    pub fn save_empty_value(mut self) -> Self {
        self.save_empty_value = true;
        self
    }

    /// With placeholder
    #[inline]
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// With label for one language
    #[inline]
    #[must_use]
    pub fn with_label(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.label.insert(language.into(), label.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With autocomplete source
    #[inline]
    #[must_use]
    pub fn with_autocomplete(mut self, source: AutocompleteSource) -> Self {
        self.autocomplete = Some(source);
        self
    }

    /// Label in `language` with its first letter upper-cased, empty if missing
    #[must_use]
    pub fn display_label(&self, language: &str) -> String {
        let Some(label) = self.label.get(language) else {
            return String::new();
        };
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Configured content languages plus the current interface language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    /// Language code to display name, in presentation order
    pub languages: IndexMap<String, String>,
    /// Language of the interface
    pub interface_language: String,
}

impl LanguageConfig {
    /// Create configuration
    pub fn new<I, K, V>(interface_language: impl Into<String>, languages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            languages: languages
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .collect(),
            interface_language: interface_language.into(),
        }
    }

    /// Configured codes in order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Whether `code` is configured
    #[inline]
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.languages.contains_key(code)
    }

    /// Display name of `code`
    #[inline]
    #[must_use]
    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.languages.get(code).map(String::as_str)
    }

    /// Number of configured languages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Whether no language is configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::new("en", [("en", "English")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_defaults_from_json() {
        let def: FieldDefinition = serde_json::from_value(json!({"binding": "schema:name"})).unwrap();
        assert_eq!(def.widget_type, "text");
        assert_eq!(def.shape, ValueShape::Literal);
        assert!(!def.required);
        assert!(def.autocomplete.is_none());
    }

    #[test]
    fn definition_autocomplete_from_json() {
        let def: FieldDefinition = serde_json::from_value(json!({
            "binding": "schema:author",
            "type": "reference",
            "shape": "reference",
            "autocomplete": {"kind": "sparql", "query": "SELECT ?uri", "source": "http://x/SEARCH_TERM"}
        }))
        .unwrap();
        assert_eq!(def.shape, ValueShape::Reference);
        assert!(matches!(def.autocomplete, Some(AutocompleteSource::Sparql { .. })));
    }

    #[test]
    fn display_label_capitalises() {
        let def = FieldDefinition::new("schema:name").with_label("en", "name");
        assert_eq!(def.display_label("en"), "Name");
        assert_eq!(def.display_label("fr"), "");
    }

    #[test]
    fn language_config_order() {
        let langs = LanguageConfig::new("en", [("en", "English"), ("fr", "French"), ("de", "German")]);
        assert_eq!(langs.codes().collect::<Vec<_>>(), vec!["en", "fr", "de"]);
        assert_eq!(langs.display_name("fr"), Some("French"));
        assert!(!langs.contains("nl"));
    }
}
