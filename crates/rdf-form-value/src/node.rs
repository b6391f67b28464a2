//! Attribute values
//!
//! A [`ValueNode`] is one value of a (possibly multi-valued) attribute. The
//! shape is decided once, when the node is decoded or created, instead of
//! being sniffed from whichever JSON-LD keyword happens to be present.

use crate::error::ValueError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const VALUE: &str = "@value";
const LANGUAGE: &str = "@language";
const ID: &str = "@id";

/// Declared shape of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueShape {
    /// Plain or language-tagged text
    #[default]
    Literal,
    /// Entity reference by URI
    Reference,
}

/// One attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ValueNode {
    /// Untagged literal text
    Literal(String),
    /// Text tagged with a language
    LocalizedLiteral {
        /// Lexical text
        text: String,
        /// BCP-47 language tag
        language: String,
    },
    /// Entity reference
    Reference(String),
}

impl ValueNode {
    /// Create untagged literal
    #[inline]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Create language-tagged literal
    #[inline]
    pub fn localized(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self::LocalizedLiteral {
            text: text.into(),
            language: language.into(),
        }
    }

    /// Create entity reference
    #[inline]
    pub fn reference(uri: impl Into<String>) -> Self {
        Self::Reference(uri.into())
    }

    /// Create an empty node of the given shape
    #[must_use]
    pub fn empty(shape: ValueShape) -> Self {
        match shape {
            ValueShape::Literal => Self::Literal(String::new()),
            ValueShape::Reference => Self::Reference(String::new()),
        }
    }

    /// Shape of this node
    #[inline]
    #[must_use]
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Literal(_) | Self::LocalizedLiteral { .. } => ValueShape::Literal,
            Self::Reference(_) => ValueShape::Reference,
        }
    }

    /// Literal text, `None` for references
    #[inline]
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Literal(text) | Self::LocalizedLiteral { text, .. } => Some(text),
            Self::Reference(_) => None,
        }
    }

    /// Reference URI, `None` for literals
    #[inline]
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Reference(uri) => Some(uri),
            _ => None,
        }
    }

    /// Language tag, if any
    #[inline]
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::LocalizedLiteral { language, .. } => Some(language),
            _ => None,
        }
    }

    /// The raw text an input shows for this node (text or URI)
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(text) | Self::LocalizedLiteral { text, .. } => text,
            Self::Reference(uri) => uri,
        }
    }

    /// Whether the node carries no text or URI
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.raw().is_empty()
    }

    /// Same shape and language, empty payload
    #[must_use]
    pub fn blanked(&self) -> Self {
        match self {
            Self::Literal(_) => Self::Literal(String::new()),
            Self::LocalizedLiteral { language, .. } => Self::localized("", language.clone()),
            Self::Reference(_) => Self::Reference(String::new()),
        }
    }

    /// Replace the payload (text or URI), keeping shape and language
    pub fn set_raw(&mut self, raw: impl Into<String>) {
        match self {
            Self::Literal(text) | Self::LocalizedLiteral { text, .. } => *text = raw.into(),
            Self::Reference(uri) => *uri = raw.into(),
        }
    }

    /// Decode one JSON-LD value
    ///
    /// Plain strings and `{"@value"}` objects become [`ValueNode::Literal`],
    /// `{"@value", "@language"}` a [`ValueNode::LocalizedLiteral`] and
    /// `{"@id"}` a [`ValueNode::Reference`]. Non-string `@value` payloads
    /// (booleans, numbers) keep their lexical form.
    ///
    /// # Errors
    /// Returns [`ValueError`] for arrays, nulls, and objects without a
    /// recognised keyword.
    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(text) => Ok(Self::Literal(text.clone())),
            Value::Bool(_) | Value::Number(_) => Ok(Self::Literal(value.to_string())),
            Value::Object(map) => Self::from_object(map),
            other => Err(ValueError::UnsupportedShape(other.to_string())),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Result<Self, ValueError> {
        if let Some(id) = map.get(ID) {
            return match id {
                Value::String(uri) => Ok(Self::Reference(uri.clone())),
                other => Err(ValueError::invalid_keyword(ID, other)),
            };
        }

        let Some(raw) = map.get(VALUE) else {
            return Err(ValueError::MissingKey(Value::Object(map.clone()).to_string()));
        };

        let text = match raw {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };

        match map.get(LANGUAGE) {
            None | Some(Value::Null) => Ok(Self::Literal(text)),
            Some(Value::String(language)) => Ok(Self::localized(text, language.clone())),
            Some(other) => Err(ValueError::invalid_keyword(LANGUAGE, other)),
        }
    }

    /// Encode as an expanded JSON-LD value object
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Self::Literal(text) => {
                map.insert(VALUE.to_string(), Value::String(text.clone()));
            }
            Self::LocalizedLiteral { text, language } => {
                map.insert(VALUE.to_string(), Value::String(text.clone()));
                map.insert(LANGUAGE.to_string(), Value::String(language.clone()));
            }
            Self::Reference(uri) => {
                map.insert(ID.to_string(), Value::String(uri.clone()));
            }
        }
        Value::Object(map)
    }
}

impl TryFrom<Value> for ValueNode {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<ValueNode> for Value {
    fn from(node: ValueNode) -> Self {
        node.to_json()
    }
}

/// Decode an attribute's raw value (single value, array, or absent)
///
/// Undecodable entries are skipped and logged.
#[must_use]
pub fn decode_values(value: Option<&Value>) -> Vec<ValueNode> {
    let items: &[Value] = match value {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(single) => std::slice::from_ref(single),
    };

    items
        .iter()
        .filter_map(|item| match ValueNode::from_json(item) {
            Ok(node) => Some(node),
            Err(err) => {
                tracing::warn!(%err, "skipping undecodable value");
                None
            }
        })
        .collect()
}
