//! Widget variants
//!
//! A widget is a stateless capability object selected by the field's type
//! string. The trait's default methods are the shared behaviour; variants
//! override only what differs:
//!
//! - [`TextWidget`]: plain text input, all defaults
//! - [`ColorWidget`]: colour picker storing lower-case hex values
//! - [`CheckboxWidget`]: boolean stored as `"true"` / `"false"`
//! - [`ReferenceWidget`]: entity picker; typing searches, values are URIs

mod checkbox;
mod color;
mod reference;
mod text;

pub use checkbox::CheckboxWidget;
pub use color::ColorWidget;
pub use reference::ReferenceWidget;
pub use text::TextWidget;

use rdf_form_enrich::Suggestion;
use rdf_form_value::FieldValueStore;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Kind of user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UiEventKind {
    /// Keystroke-level input
    Input,
    /// Committed change
    Change,
    /// Click on a toggle
    Click,
    /// Suggestion picked from a list
    Select,
}

/// Raw user interaction as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiEvent {
    /// Interaction kind
    pub kind: UiEventKind,
    /// Current input value
    pub value: String,
    /// Toggle state for checkbox-like inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl UiEvent {
    /// Keystroke input carrying `value`
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            kind: UiEventKind::Input,
            value: value.into(),
            checked: None,
        }
    }

    /// Committed change carrying `value`
    pub fn change(value: impl Into<String>) -> Self {
        Self {
            kind: UiEventKind::Change,
            value: value.into(),
            checked: None,
        }
    }

    /// Toggle click
    #[must_use]
    pub fn click(checked: bool) -> Self {
        Self {
            kind: UiEventKind::Click,
            value: String::new(),
            checked: Some(checked),
        }
    }

    /// Suggestion selection carrying the chosen value
    pub fn select(value: impl Into<String>) -> Self {
        Self {
            kind: UiEventKind::Select,
            value: value.into(),
            checked: None,
        }
    }
}

/// Payload of the field's event channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEvent {
    /// Interaction that caused the change
    pub original_event: UiEvent,
    /// Slot affected
    pub index: usize,
    /// Slot value after the change
    pub value: String,
}

/// What a widget did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// The store was mutated
    Changed,
    /// Start a suggestion search for this term
    Search(String),
    /// Nothing to do
    Ignored,
}

/// Input control a slot renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    /// Text box
    Text,
    /// Colour picker
    Color,
    /// Checkbox
    Checkbox,
    /// Entity search box
    Reference,
}

/// Selectable language of a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    /// Language tag
    pub code: String,
    /// Display name
    pub name: String,
}

/// Display data of a referenced entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceView {
    /// Entity URI
    pub uri: String,
    /// Resolved label, the URI when none resolved, or a loading marker
    pub label: String,
    /// Thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// View model of one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    /// Slot index
    pub index: usize,
    /// Input control
    pub input: InputKind,
    /// Raw value (text or URI)
    pub value: String,
    /// Language tag of a translated slot
    pub language: Option<String>,
    /// Languages this slot may switch to, its own included
    pub language_options: Vec<LanguageOption>,
    /// Placeholder in the interface language
    pub placeholder: Option<String>,
    /// Whether the slot must hold a value
    pub required: bool,
    /// Whether the slot offers a remove action
    pub removable: bool,
    /// Checkbox state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Entity display data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceView>,
    /// Autocomplete candidates
    pub suggestions: Vec<Suggestion>,
    /// Whether the detail area is open
    pub expanded: bool,
}

/// Everything a widget may read when rendering one slot
#[derive(Debug)]
pub struct ItemContext<'a> {
    /// Field values
    pub store: &'a FieldValueStore,
    /// Slot rendered; may equal `store.len()` for the synthetic empty slot
    pub index: usize,
    /// Current suggestions for the slot
    pub suggestions: &'a [Suggestion],
    /// Entity display data for reference slots
    pub reference: Option<ReferenceView>,
    /// Whether the slot's detail area is open
    pub expanded: bool,
}

/// Capability interface shared by all widget variants
pub trait Widget: fmt::Debug + Send + Sync {
    /// Registry key
    fn type_name(&self) -> &'static str;

    /// Input control used by [`Widget::template_item`]
    fn input_kind(&self) -> InputKind {
        InputKind::Text
    }

    /// View model for one slot
    fn template_item(&self, ctx: ItemContext<'_>) -> ItemView {
        default_item(self.input_kind(), ctx)
    }

    /// Apply a user event to slot `index`
    fn on(&self, event: &UiEvent, index: usize, store: &mut FieldValueStore) -> Reaction {
        match event.kind {
            UiEventKind::Input | UiEventKind::Change => {
                store.set_value(event.value.clone(), index);
                Reaction::Changed
            }
            UiEventKind::Click | UiEventKind::Select => Reaction::Ignored,
        }
    }

    /// Marker persisted for missing values under the persist-empty policy
    fn empty_marker(&self) -> &'static str {
        ""
    }

    /// Values in wire shape, `None` when the attribute should be omitted
    fn serialize(&self, store: &FieldValueStore) -> Option<Vec<Value>> {
        store.serialize_with(self.empty_marker())
    }
}

/// Slot view model built from the store alone
#[must_use]
pub fn default_item(input: InputKind, ctx: ItemContext<'_>) -> ItemView {
    let store = ctx.store;
    let node = store.get(ctx.index);
    let languages = store.languages();

    let language_options = store
        .language_options(ctx.index)
        .into_iter()
        .map(|code| LanguageOption {
            code: code.to_string(),
            name: languages.display_name(code).unwrap_or(code).to_string(),
        })
        .collect();

    ItemView {
        index: ctx.index,
        input,
        value: node.map(|n| n.raw().to_string()).unwrap_or_default(),
        language: node.and_then(|n| n.language()).map(str::to_string),
        language_options,
        placeholder: store.definition().placeholder.clone(),
        required: store.is_required(ctx.index),
        removable: store.show_remove_button(ctx.index),
        checked: None,
        reference: ctx.reference,
        suggestions: ctx.suggestions.to_vec(),
        expanded: ctx.expanded,
    }
}
