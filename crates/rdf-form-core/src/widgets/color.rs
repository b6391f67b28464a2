use super::{default_item, InputKind, ItemContext, ItemView, Reaction, UiEvent, UiEventKind, Widget};
use rdf_form_value::FieldValueStore;

/// Value a colour picker shows when the slot is empty
const DEFAULT_COLOR: &str = "#000000";

/// Colour picker
///
/// Stores hex values in lower case so equal colours compare equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorWidget;

impl Widget for ColorWidget {
    fn type_name(&self) -> &'static str {
        "color"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Color
    }

    fn template_item(&self, ctx: ItemContext<'_>) -> ItemView {
        let mut item = default_item(self.input_kind(), ctx);
        if item.value.is_empty() {
            item.value = DEFAULT_COLOR.to_string();
        }
        item
    }

    fn on(&self, event: &UiEvent, index: usize, store: &mut FieldValueStore) -> Reaction {
        match event.kind {
            UiEventKind::Input | UiEventKind::Change => {
                store.set_value(event.value.to_ascii_lowercase(), index);
                Reaction::Changed
            }
            UiEventKind::Click | UiEventKind::Select => Reaction::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_form_test_utils::{en_fr, store, text_field};

    #[test]
    fn stores_lower_case_hex() {
        let mut store = store(text_field("ex:color").with_widget_type("color"), en_fr(), None);

        ColorWidget.on(&UiEvent::change("#FFAA00"), 0, &mut store);
        assert_eq!(store.get(0).map(|n| n.raw()), Some("#ffaa00"));
    }

    #[test]
    fn empty_slot_shows_black() {
        let store = store(text_field("ex:color"), en_fr(), None);
        let item = ColorWidget.template_item(ItemContext {
            store: &store,
            index: 0,
            suggestions: &[],
            reference: None,
            expanded: false,
        });

        assert_eq!(item.input, InputKind::Color);
        assert_eq!(item.value, "#000000");
    }
}
