//! Per-attribute value store
//!
//! [`FieldValueStore`] owns the ordered values of one attribute and is the
//! unit of mutation. Every mutator is total: requests that would break an
//! invariant (out-of-range index, removing the last required value, a
//! duplicate language tag) are absorbed as no-ops, since they come from user
//! input racing the redraw rather than from programming errors.
//!
//! # Invariants
//!
//! - All nodes share the declared [`ValueShape`] of the definition.
//! - When the first node carries a language tag every node does, and no two
//!   nodes share a tag.
//! - When `multiple` is false the store holds at most one node.
//! - When `required` is true the last remaining node cannot be removed.

use crate::definition::{FieldDefinition, LanguageConfig};
use crate::node::{decode_values, ValueNode, ValueShape};
use serde_json::Value;
use std::sync::Arc;

/// Partial update merged into one slot by [`FieldValueStore::set`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    /// New literal text
    pub text: Option<String>,
    /// New language tag
    pub language: Option<String>,
    /// New reference URI; turns the slot into a reference
    pub uri: Option<String>,
}

impl NodeUpdate {
    /// Update the text
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Update the reference URI
    #[inline]
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Also set the language
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Ordered values of one attribute
#[derive(Debug, Clone)]
pub struct FieldValueStore {
    definition: Arc<FieldDefinition>,
    languages: LanguageConfig,
    nodes: Vec<ValueNode>,
}

impl FieldValueStore {
    /// Create a store from already decoded nodes
    ///
    /// Nodes whose shape contradicts the declared shape are dropped, as are
    /// nodes past the first when `multiple` is false.
    pub fn new(
        definition: Arc<FieldDefinition>,
        languages: LanguageConfig,
        nodes: impl IntoIterator<Item = ValueNode>,
    ) -> Self {
        let shape = definition.shape;
        let mut nodes: Vec<ValueNode> = nodes
            .into_iter()
            .filter(|node| {
                let keep = node.shape() == shape;
                if !keep {
                    tracing::warn!(
                        binding = %definition.binding,
                        ?node,
                        "dropping value that does not match the declared shape"
                    );
                }
                keep
            })
            .collect();

        if !definition.multiple && !definition.translatable && nodes.len() > 1 {
            tracing::warn!(
                binding = %definition.binding,
                count = nodes.len(),
                "single-valued field holds several values, keeping the first"
            );
            nodes.truncate(1);
        }

        Self {
            definition,
            languages,
            nodes,
        }
    }

    /// Create a store from the record's raw JSON-LD value for this binding
    pub fn from_json(
        definition: Arc<FieldDefinition>,
        languages: LanguageConfig,
        value: Option<&Value>,
    ) -> Self {
        Self::new(definition, languages, decode_values(value))
    }

    /// Field definition
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    /// Language configuration
    #[inline]
    #[must_use]
    pub fn languages(&self) -> &LanguageConfig {
        &self.languages
    }

    /// Node at `index`, `None` past the end
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ValueNode> {
        self.nodes.get(index)
    }

    /// All nodes in order
    #[inline]
    #[must_use]
    pub fn get_all(&self) -> &[ValueNode] {
        &self.nodes
    }

    /// Number of stored nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of slots to render; an empty store still shows one
    #[inline]
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.nodes.len().max(1)
    }

    /// Slots to render, with `None` standing for the synthetic empty slot
    #[must_use]
    pub fn render_slots(&self) -> Vec<Option<&ValueNode>> {
        (0..self.render_count()).map(|i| self.nodes.get(i)).collect()
    }

    /// Whether the slot must hold a value
    #[inline]
    #[must_use]
    pub fn is_required(&self, index: usize) -> bool {
        index == 0 && self.definition.required
    }

    /// Whether the slot offers a remove action
    #[inline]
    #[must_use]
    pub fn show_remove_button(&self, index: usize) -> bool {
        index > 0
    }

    /// Whether the store holds language-tagged values
    #[inline]
    #[must_use]
    pub fn has_translations(&self) -> bool {
        self.nodes.first().and_then(ValueNode::language).is_some()
    }

    /// Whether another language can still be added
    #[must_use]
    pub fn another_translation_is_possible(&self) -> bool {
        self.definition.translatable
            && self.has_translations()
            && !self.unused_languages().is_empty()
    }

    /// Configured languages no node uses yet, in configured order
    #[must_use]
    pub fn unused_languages(&self) -> Vec<&str> {
        self.languages
            .codes()
            .filter(|code| !self.language_in_use(code))
            .collect()
    }

    /// Languages the selector of slot `index` may offer: the unused ones
    /// plus the slot's own
    #[must_use]
    pub fn language_options(&self, index: usize) -> Vec<&str> {
        let own = self.nodes.get(index).and_then(ValueNode::language);
        self.languages
            .codes()
            .filter(|code| Some(*code) == own || !self.language_in_use(code))
            .collect()
    }

    fn language_in_use(&self, code: &str) -> bool {
        self.nodes.iter().any(|node| node.language() == Some(code))
    }

    fn language_in_use_elsewhere(&self, code: &str, index: usize) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .any(|(i, node)| i != index && node.language() == Some(code))
    }

    fn first_unused_language(&self) -> Option<String> {
        self.unused_languages().first().map(|code| (*code).to_string())
    }

    fn at_capacity(&self) -> bool {
        !self.definition.multiple && !self.has_translations() && !self.nodes.is_empty()
    }

    /// Whether slot `index` may carry `language` without leaving an
    /// untagged neighbour or a duplicate tag behind
    fn accepts_language(&self, language: &str, index: usize) -> bool {
        let tags_whole_store =
            self.has_translations() || self.nodes.is_empty() || (self.nodes.len() == 1 && index == 0);
        self.definition.translatable
            && self.definition.shape == ValueShape::Literal
            && self.languages.contains(language)
            && tags_whole_store
            && !self.language_in_use_elsewhere(language, index)
    }

    /// Merge `update` into the node at `index`, creating it at `index == len`
    ///
    /// An update carrying a URI turns the slot into a reference. Text and
    /// language only apply to literal slots. A language is accepted on translatable fields when
    /// it is configured, unused by other slots and every slot ends up
    /// tagged; otherwise the whole update is rejected. A new slot in a
    /// translated store without a language takes the first unused one.
    pub fn set(&mut self, index: usize, update: NodeUpdate) {
        if index > self.nodes.len() {
            tracing::debug!(index, len = self.nodes.len(), "ignoring set past the end");
            return;
        }
        if index == self.nodes.len() && self.at_capacity() {
            tracing::debug!(index, "ignoring set beyond single-value capacity");
            return;
        }
        if let Some(language) = update.language.as_deref() {
            if !self.accepts_language(language, index) {
                tracing::debug!(index, language, "ignoring language tag");
                return;
            }
        }

        let current = self.nodes.get(index);
        let next = if let Some(uri) = update.uri {
            ValueNode::Reference(uri)
        } else {
            match current {
                Some(ValueNode::Reference(uri)) => ValueNode::Reference(uri.clone()),
                None if self.definition.shape == ValueShape::Reference => {
                    ValueNode::Reference(String::new())
                }
                _ => {
                    let text = update
                        .text
                        .or_else(|| current.and_then(ValueNode::text).map(str::to_string))
                        .unwrap_or_default();
                    let mut language = update
                        .language
                        .or_else(|| current.and_then(ValueNode::language).map(str::to_string));
                    if language.is_none() && self.has_translations() {
                        language = self.first_unused_language();
                        if language.is_none() {
                            tracing::debug!(index, "no language left for new value");
                            return;
                        }
                    }
                    match language {
                        Some(language) => ValueNode::localized(text, language),
                        None => ValueNode::Literal(text),
                    }
                }
            }
        };

        if index == self.nodes.len() {
            self.nodes.push(next);
        } else {
            self.nodes[index] = next;
        }
    }

    /// Write raw input into slot `index`
    ///
    /// Writes the text of a literal or the URI of a reference. An empty slot
    /// (`index == len`) gets a node of the declared shape, tagged with an
    /// unused language when the store holds translations.
    pub fn set_value(&mut self, raw: impl Into<String>, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.set_raw(raw);
            return;
        }
        if index != self.nodes.len() || self.at_capacity() {
            tracing::debug!(index, len = self.nodes.len(), "ignoring value for missing slot");
            return;
        }

        let node = match self.definition.shape {
            ValueShape::Reference => ValueNode::Reference(raw.into()),
            ValueShape::Literal if self.has_translations() => {
                let Some(language) = self.first_unused_language() else {
                    tracing::debug!(index, "no language left for new value");
                    return;
                };
                ValueNode::localized(raw, language)
            }
            ValueShape::Literal => ValueNode::Literal(raw.into()),
        };
        self.nodes.push(node);
    }

    /// Append an empty node shaped like the first one
    ///
    /// With translations present the new node takes the first unused
    /// language, as a copied tag would collide.
    pub fn add_item(&mut self) {
        if self.has_translations() {
            self.add_translation();
            return;
        }
        if self.at_capacity() {
            tracing::debug!(binding = %self.definition.binding, "field is single-valued");
            return;
        }

        let node = self
            .nodes
            .first()
            .map_or_else(|| ValueNode::empty(self.definition.shape), ValueNode::blanked);
        self.nodes.push(node);
    }

    /// Append an empty literal in the first unused language
    pub fn add_translation(&mut self) {
        if !self.definition.translatable || self.definition.shape != ValueShape::Literal {
            return;
        }
        if !self.nodes.is_empty() && !self.has_translations() {
            tracing::debug!("enable translations before adding one");
            return;
        }
        if let Some(language) = self.first_unused_language() {
            self.nodes.push(ValueNode::localized("", language));
        }
    }

    /// Remove slot `index`, shifting later slots down
    pub fn remove_item(&mut self, index: usize) {
        if index >= self.nodes.len() {
            tracing::debug!(index, len = self.nodes.len(), "ignoring remove past the end");
            return;
        }
        if index == 0 && self.definition.required && self.nodes.len() < 2 {
            tracing::debug!(binding = %self.definition.binding, "required value is not removable");
            return;
        }
        self.nodes.remove(index);
    }

    /// Change the language of slot `index`
    ///
    /// Ignored for unconfigured or already used tags and untagged slots.
    pub fn change_language(&mut self, index: usize, language: &str) {
        if !self.languages.contains(language) || self.language_in_use_elsewhere(language, index) {
            tracing::debug!(index, language, "ignoring language change");
            return;
        }
        if let Some(ValueNode::LocalizedLiteral { language: current, .. }) =
            self.nodes.get_mut(index)
        {
            *current = language.to_string();
        }
    }

    /// Tag every literal with a language
    ///
    /// The first node takes the interface language, later ones the next
    /// unused configured languages. Nodes left without a language are
    /// dropped. An empty store gets one empty slot in the interface
    /// language.
    pub fn enable_translations(&mut self) {
        if !self.definition.translatable
            || self.definition.shape != ValueShape::Literal
            || self.has_translations()
        {
            return;
        }

        let interface = self.languages.interface_language.clone();
        let mut remaining = self
            .languages
            .codes()
            .filter(|code| *code != interface)
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into_iter();

        let texts: Vec<String> = self
            .nodes
            .drain(..)
            .map(|node| node.raw().to_string())
            .collect();

        if texts.is_empty() {
            self.nodes.push(ValueNode::localized("", interface));
            return;
        }

        let total = texts.len();
        for (i, text) in texts.into_iter().enumerate() {
            let language = if i == 0 {
                Some(interface.clone())
            } else {
                remaining.next()
            };
            match language {
                Some(language) => self.nodes.push(ValueNode::localized(text, language)),
                None => {
                    tracing::debug!(dropped = total - i, "ran out of languages while tagging");
                    break;
                }
            }
        }
    }

    /// Collapse translations into one untagged literal holding the first text
    pub fn remove_translations(&mut self) {
        if !self.has_translations() {
            return;
        }
        let text = self.nodes[0].raw().to_string();
        self.nodes.clear();
        self.nodes.push(ValueNode::Literal(text));
    }

    /// Blank the URI of reference slot `index`
    pub fn remove_reference(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            if node.shape() == ValueShape::Reference {
                node.set_raw("");
            }
        }
    }

    /// Values in wire shape, `None` when there are none
    #[must_use]
    pub fn serialize(&self) -> Option<Vec<Value>> {
        self.serialize_with("")
    }

    /// Values in wire shape, padded with `empty_marker` under the
    /// persist-empty policy
    ///
    /// With translations, every configured language without a value gets a
    /// marker entry. Without translations a single marker entry stands in
    /// for an attribute that holds no value at all. The store itself is not
    /// modified.
    #[must_use]
    pub fn serialize_with(&self, empty_marker: &str) -> Option<Vec<Value>> {
        let mut values: Vec<Value> = self.nodes.iter().map(ValueNode::to_json).collect();

        if self.definition.save_empty_value {
            if self.has_translations() {
                values.extend(
                    self.unused_languages()
                        .into_iter()
                        .map(|language| ValueNode::localized(empty_marker, language).to_json()),
                );
            } else if values.is_empty() {
                let mut marker = ValueNode::empty(self.definition.shape);
                marker.set_raw(empty_marker);
                values.push(marker.to_json());
            }
        }

        (!values.is_empty()).then_some(values)
    }
}
