//! RDF Form Values
//!
//! Typed attribute values and the store that keeps one attribute's values
//! consistent under rapid user edits.
//!
//! # Core Concepts
//!
//! - [`ValueNode`]: one value; literal, language-tagged literal, or reference
//! - [`FieldDefinition`]: read-only description of an attribute
//! - [`LanguageConfig`]: configured content languages and interface language
//! - [`FieldValueStore`]: ordered values of one attribute, the unit of mutation
//!
//! # Example
//!
//! ```rust
//! use rdf_form_value::{FieldDefinition, FieldValueStore, LanguageConfig};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let definition = Arc::new(FieldDefinition::new("schema:name").translatable());
//! let languages = LanguageConfig::new("en", [("en", "English"), ("fr", "French")]);
//! let value = json!({"@value": "Paris", "@language": "en"});
//!
//! let mut store = FieldValueStore::from_json(definition, languages, Some(&value));
//! store.add_translation();
//! assert_eq!(store.len(), 2);
//! ```

#![warn(unreachable_pub)]

mod definition;
mod error;
mod node;
mod store;

pub use definition::{AutocompleteSource, FieldDefinition, LanguageConfig, DEFAULT_WIDGET_TYPE};
pub use error::ValueError;
pub use node::{decode_values, ValueNode, ValueShape};
pub use store::{FieldValueStore, NodeUpdate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
