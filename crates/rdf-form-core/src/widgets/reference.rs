use super::{InputKind, Reaction, UiEvent, UiEventKind, Widget};
use rdf_form_value::{FieldValueStore, NodeUpdate};

/// Entity picker
///
/// Keystrokes start a suggestion search instead of editing the value; the
/// value only changes when a URI is committed or a suggestion is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceWidget;

impl Widget for ReferenceWidget {
    fn type_name(&self) -> &'static str {
        "reference"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Reference
    }

    fn on(&self, event: &UiEvent, index: usize, store: &mut FieldValueStore) -> Reaction {
        match event.kind {
            UiEventKind::Input => Reaction::Search(event.value.clone()),
            UiEventKind::Change | UiEventKind::Select if looks_like_uri(&event.value) => {
                store.set(index, NodeUpdate::uri(event.value.clone()));
                Reaction::Changed
            }
            _ => Reaction::Ignored,
        }
    }
}

fn looks_like_uri(value: &str) -> bool {
    value
        .split_once(':')
        .is_some_and(|(scheme, rest)| !scheme.is_empty() && !rest.is_empty() && !value.contains(char::is_whitespace))
}
