use super::{default_item, InputKind, ItemContext, ItemView, Reaction, UiEvent, UiEventKind, Widget};
use rdf_form_value::FieldValueStore;

const TRUE: &str = "true";
const FALSE: &str = "false";

/// Boolean toggle stored as `"true"` / `"false"`
///
/// A missing value is persisted as `"false"` under the persist-empty policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxWidget;

impl Widget for CheckboxWidget {
    fn type_name(&self) -> &'static str {
        "checkbox"
    }

    fn input_kind(&self) -> InputKind {
        InputKind::Checkbox
    }

    fn template_item(&self, ctx: ItemContext<'_>) -> ItemView {
        let mut item = default_item(self.input_kind(), ctx);
        item.checked = Some(item.value == TRUE);
        item
    }

    fn on(&self, event: &UiEvent, index: usize, store: &mut FieldValueStore) -> Reaction {
        if !matches!(event.kind, UiEventKind::Click | UiEventKind::Change) {
            return Reaction::Ignored;
        }
        // Without an explicit state the click toggles.
        let checked = event
            .checked
            .unwrap_or_else(|| store.get(index).map_or(true, |node| node.raw() != TRUE));
        store.set_value(if checked { TRUE } else { FALSE }, index);
        Reaction::Changed
    }

    fn empty_marker(&self) -> &'static str {
        FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdf_form_test_utils::{en_fr, store, text_field};
    use serde_json::json;

    #[test]
    fn click_stores_boolean_text() {
        let mut store = store(text_field("ex:active").with_widget_type("checkbox"), en_fr(), None);

        CheckboxWidget.on(&UiEvent::click(true), 0, &mut store);
        assert_eq!(store.get(0).map(|n| n.raw()), Some("true"));
        CheckboxWidget.on(&UiEvent::click(false), 0, &mut store);
        assert_eq!(store.get(0).map(|n| n.raw()), Some("false"));
    }

    #[test]
    fn change_without_state_toggles() {
        let value = json!({"@value": "true"});
        let mut store = store(text_field("ex:active"), en_fr(), Some(&value));

        CheckboxWidget.on(&UiEvent::change(""), 0, &mut store);
        assert_eq!(store.get(0).map(|n| n.raw()), Some("false"));
    }

    #[test]
    fn keeps_slot_language() {
        let value = json!([{"@value": "true", "@language": "fr"}]);
        let mut store = store(text_field("ex:active").translatable(), en_fr(), Some(&value));

        CheckboxWidget.on(&UiEvent::click(false), 0, &mut store);
        assert_eq!(store.get(0).and_then(|n| n.language()), Some("fr"));
    }

    #[test]
    fn missing_value_persists_false() {
        let store = store(text_field("ex:active").save_empty_value(), en_fr(), None);
        assert_eq!(CheckboxWidget.serialize(&store), Some(vec![json!({"@value": "false"})]));
    }

    #[test]
    fn view_reports_checked_state() {
        let value = json!({"@value": "true"});
        let store = store(text_field("ex:active"), en_fr(), Some(&value));
        let item = CheckboxWidget.template_item(ItemContext {
            store: &store,
            index: 0,
            suggestions: &[],
            reference: None,
            expanded: false,
        });
        assert_eq!(item.checked, Some(true));
    }
}
