//! Per-field controller
//!
//! [`FieldController`] owns everything one attribute needs while its widget
//! lives:
//! - the [`FieldValueStore`] holding the values
//! - the widget variant that interprets user events
//! - a [`MetaCache`] for the labels of referenced entities
//! - a [`SuggestionEngine`] for autocomplete
//! - a [`RenderScheduler`] handle; every mutation ends with a redraw request
//! - the event channel, slot expansion flags and the field menu state
//!
//! Mutations are synchronous and total. Lookups run on tokio and request a
//! redraw when they land.

use crate::error::FormError;
use crate::registry::WidgetRegistry;
use crate::widgets::{FieldEvent, ItemContext, ItemView, Reaction, ReferenceView, UiEvent, UiEventKind, Widget};
use futures::future::join_all;
use parking_lot::Mutex;
use rdf_form_enrich::{
    DbpediaLookup, EntityLookup, FormConfig, MetaCache, PathFactory, Projection, QueryEngine, RenderScheduler, SearchHandle,
    SearchSettings, Suggestion, SuggestionEngine, SuggestionSource, TraversalHandle,
};
use rdf_form_value::{AutocompleteSource, FieldDefinition, FieldValueStore, NodeUpdate, ValueNode, ValueShape};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Label shown while an entity's label is still resolving
pub const LOADING_LABEL: &str = "Loading...";

/// Listener on the field's event channel
pub type EventListener = Arc<dyn Fn(&FieldEvent) + Send + Sync>;

/// Handles of the entities the store currently references
type HandleMap = Arc<Mutex<HashMap<String, Arc<TraversalHandle>>>>;

/// External services shared by all fields of a form
#[derive(Clone, Default)]
pub struct Services {
    /// Entity traversal for reference labels
    pub path_factory: Option<Arc<dyn PathFactory>>,
    /// Query execution for SPARQL autocomplete
    pub query_engine: Option<Arc<dyn QueryEngine>>,
    /// Free-text entity lookup
    pub entity_lookup: Option<Arc<dyn EntityLookup>>,
}

impl Services {
    /// No services; labels fall back to URIs and nothing autocompletes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Services available from configuration alone: the free-text lookup
    /// at `lookup_endpoint`, routed through `proxy`
    ///
    /// # Errors
    /// Returns [`FormError::Lookup`] for an unparsable endpoint or proxy
    pub fn from_config(config: &FormConfig) -> Result<Self, FormError> {
        let lookup = DbpediaLookup::new(&config.lookup_endpoint, config.proxy.as_deref())?;
        Ok(Self::new().with_entity_lookup(Arc::new(lookup)))
    }

    /// With entity traversal
    #[must_use]
    pub fn with_path_factory(mut self, factory: Arc<dyn PathFactory>) -> Self {
        self.path_factory = Some(factory);
        self
    }

    /// With query execution
    #[must_use]
    pub fn with_query_engine(mut self, engine: Arc<dyn QueryEngine>) -> Self {
        self.query_engine = Some(engine);
        self
    }

    /// With free-text lookup
    #[must_use]
    pub fn with_entity_lookup(mut self, lookup: Arc<dyn EntityLookup>) -> Self {
        self.entity_lookup = Some(lookup);
        self
    }

    /// Suggestion source for `definition`, if its autocomplete can be served
    #[must_use]
    pub fn suggestion_source(&self, definition: &FieldDefinition) -> Option<SuggestionSource> {
        let source = match definition.autocomplete.as_ref()? {
            AutocompleteSource::Sparql { query, source } => {
                self.query_engine.clone().map(|engine| SuggestionSource::Sparql {
                    engine,
                    query: query.clone(),
                    source: source.clone(),
                })
            }
            AutocompleteSource::FreeText => self.entity_lookup.clone().map(SuggestionSource::FreeText),
        };
        if source.is_none() {
            tracing::warn!(binding = %definition.binding, "autocomplete configured without a lookup service");
        }
        source
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("path_factory", &self.path_factory.is_some())
            .field("query_engine", &self.query_engine.is_some())
            .field("entity_lookup", &self.entity_lookup.is_some())
            .finish()
    }
}

/// Entry of the field menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuButton {
    /// Tag values with languages
    CreateTranslations,
    /// Collapse translations into one value
    RemoveTranslations,
}

/// View model of the whole field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    /// Attribute key in the record
    pub binding: String,
    /// Widget type
    pub widget: &'static str,
    /// Field label in the interface language
    pub label: String,
    /// Help text
    pub description: Option<String>,
    /// Whether the field must hold a value
    pub required: bool,
    /// Whether the values are language-tagged
    pub has_translations: bool,
    /// Whether the add action is offered
    pub can_add: bool,
    /// Whether the field menu is open
    pub menu_open: bool,
    /// Actions of the field menu
    pub menu_buttons: Vec<MenuButton>,
    /// One entry per rendered slot
    pub items: Vec<ItemView>,
}

/// Orchestrator of one editable attribute
pub struct FieldController {
    store: FieldValueStore,
    widget: Arc<dyn Widget>,
    metas: Option<MetaCache>,
    handles: HandleMap,
    suggestions: SuggestionEngine,
    scheduler: RenderScheduler,
    listeners: Mutex<Vec<EventListener>>,
    expanded: Vec<bool>,
    menu_open: bool,
}

impl FieldController {
    /// Create controller
    ///
    /// The scheduler is the widget's own; search results request redraws
    /// through it. Inside a tokio runtime, labels of entities already in the
    /// record start resolving right away.
    pub fn new(
        store: FieldValueStore,
        widget: Arc<dyn Widget>,
        services: &Services,
        config: &FormConfig,
        scheduler: RenderScheduler,
    ) -> Self {
        let language = store.languages().interface_language.clone();
        let settings = SearchSettings {
            min_len: config.min_search_len,
            debounce: config.search_debounce(),
            language: language.clone(),
            proxy: config.proxy.clone(),
        };
        let redraw = scheduler.clone();
        let suggestions = SuggestionEngine::new(services.suggestion_source(store.definition()), settings)
            .with_listener(Arc::new(move || redraw.request_render()));
        let metas = services
            .path_factory
            .clone()
            .map(|factory| MetaCache::new(factory, config, &language));

        let controller = Self {
            store,
            widget,
            metas,
            handles: Arc::new(Mutex::new(HashMap::new())),
            suggestions,
            scheduler,
            listeners: Mutex::new(Vec::new()),
            expanded: Vec::new(),
            menu_open: false,
        };
        controller.spawn_meta_refresh();
        controller
    }

    /// Create controller with the widget registered for the field's type
    ///
    /// Returns `None` (logged) for an unknown type.
    pub fn build(
        registry: &WidgetRegistry,
        store: FieldValueStore,
        services: &Services,
        config: &FormConfig,
        scheduler: RenderScheduler,
    ) -> Option<Self> {
        let widget = registry.create(&store.definition().widget_type)?;
        Some(Self::new(store, widget, services, config, scheduler))
    }

    /// Field values
    #[inline]
    #[must_use]
    pub fn store(&self) -> &FieldValueStore {
        &self.store
    }

    /// Field definition
    #[inline]
    #[must_use]
    pub fn definition(&self) -> &FieldDefinition {
        self.store.definition()
    }

    /// Widget variant
    #[inline]
    #[must_use]
    pub fn widget(&self) -> &dyn Widget {
        &*self.widget
    }

    /// Redraw scheduler
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Entity metadata cache, when traversal is available
    #[inline]
    #[must_use]
    pub fn metas(&self) -> Option<&MetaCache> {
        self.metas.as_ref()
    }

    /// Add a listener to the event channel
    pub fn subscribe(&self, listener: impl Fn(&FieldEvent) + Send + Sync + 'static) {
        self.listeners.lock().push(Arc::new(listener));
    }

    fn emit(&self, original_event: UiEvent, index: usize) {
        let event = FieldEvent {
            original_event,
            index,
            value: self.store.get(index).map(|n| n.raw().to_string()).unwrap_or_default(),
        };
        let listeners = self.listeners.lock().clone();
        for listener in &listeners {
            listener(&event);
        }
    }

    /// Route a user event on slot `index` through the widget
    ///
    /// Returns the search started when the widget asked for one, or when
    /// typing into a field with autocomplete.
    pub fn handle_event(&mut self, index: usize, event: UiEvent) -> Option<SearchHandle> {
        match self.widget.on(&event, index, &mut self.store) {
            Reaction::Changed => {
                let typed = (event.kind == UiEventKind::Input && self.suggestions.has_source())
                    .then(|| event.value.clone());
                if self.definition().shape == ValueShape::Reference {
                    self.prune_handles();
                    self.spawn_meta_refresh();
                }
                self.emit(event, index);
                self.scheduler.request_render();
                typed.and_then(|term| self.search(index, &term))
            }
            Reaction::Search(term) => self.search(index, &term),
            Reaction::Ignored => {
                tracing::trace!(index, kind = ?event.kind, "event ignored by widget");
                None
            }
        }
    }

    /// Append a value
    pub fn add_item(&mut self) {
        self.store.add_item();
        self.scheduler.request_render();
    }

    /// Append a translation in an unused language
    pub fn add_translation(&mut self) {
        self.store.add_translation();
        self.scheduler.request_render();
    }

    /// Remove slot `index`
    ///
    /// Later slots shift down, so every slot's suggestions are dropped.
    pub fn remove_item(&mut self, index: usize) {
        let before = self.store.len();
        self.store.remove_item(index);
        if self.store.len() < before {
            if index < self.expanded.len() {
                self.expanded.remove(index);
            }
            self.suggestions.clear_all();
            self.prune_handles();
        }
        self.scheduler.request_render();
    }

    /// Tag every value with a language
    pub fn enable_translations(&mut self) {
        self.store.enable_translations();
        self.scheduler.request_render();
    }

    /// Collapse translations into one untagged value
    pub fn remove_translations(&mut self) {
        self.store.remove_translations();
        self.expanded.clear();
        self.suggestions.clear_all();
        self.scheduler.request_render();
    }

    /// Change the language of slot `index`
    pub fn change_language(&mut self, index: usize, language: &str) {
        self.store.change_language(index, language);
        self.scheduler.request_render();
    }

    /// Start a suggestion search for slot `index`
    ///
    /// Must be called within a tokio runtime when `term` reaches the
    /// search threshold.
    pub fn search(&self, index: usize, term: &str) -> Option<SearchHandle> {
        self.suggestions.search(index, term)
    }

    /// Current suggestions for slot `index`
    #[must_use]
    pub fn suggestions(&self, index: usize) -> Vec<Suggestion> {
        self.suggestions.results(index)
    }

    /// Apply suggestion `position` of slot `index` to the store
    ///
    /// Returns `false` when no such suggestion exists.
    pub fn select_suggestion(&mut self, index: usize, position: usize) -> bool {
        let Some(suggestion) = self.suggestions.select(index, position) else {
            tracing::debug!(index, position, "no suggestion to select");
            return false;
        };
        let chosen = match &suggestion {
            Suggestion::Reference { uri, .. } => {
                self.store.set(index, NodeUpdate::uri(uri.clone()));
                self.prune_handles();
                self.spawn_meta_refresh();
                uri.clone()
            }
            Suggestion::Literal { value, .. } => {
                self.store.set_value(value.clone(), index);
                value.clone()
            }
        };
        self.suggestions.clear(index);
        if let Some(expanded) = self.expanded.get_mut(index) {
            *expanded = false;
        }
        self.emit(UiEvent::select(chosen), index);
        self.scheduler.request_render();
        true
    }

    /// Blank the reference in slot `index`
    pub fn remove_reference(&mut self, index: usize) {
        self.store.remove_reference(index);
        self.prune_handles();
        self.suggestions.clear(index);
        self.scheduler.request_render();
    }

    /// Distinct non-blank URIs the store references, sorted
    fn referenced_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self
            .store
            .get_all()
            .iter()
            .filter_map(ValueNode::uri)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .collect();
        uris.sort_unstable();
        uris.dedup();
        uris
    }

    /// Forget handles of entities the store no longer references
    fn prune_handles(&self) {
        let uris = self.referenced_uris();
        self.handles
            .lock()
            .retain(|uri, _| uris.binary_search(uri).is_ok());
    }

    /// Resolve metadata for every referenced entity on the current runtime
    fn spawn_meta_refresh(&self) {
        let Some(metas) = self.metas.clone() else {
            return;
        };
        let uris = self.referenced_uris();
        if uris.is_empty() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(binding = %self.definition().binding, "no runtime, labels resolve on update_metas");
            return;
        };
        runtime.spawn(refresh_handles(
            metas,
            Arc::clone(&self.handles),
            self.scheduler.clone(),
            uris,
        ));
    }

    /// Resolve label and thumbnail handles for every referenced entity
    ///
    /// Handles are read through the metadata cache, so a URI the cache
    /// evicted gets a fresh pipeline. Each new handle requests a redraw once
    /// both projections landed. Without entity traversal this does nothing.
    pub async fn update_metas(&self) {
        let Some(metas) = self.metas.clone() else {
            return;
        };
        self.prune_handles();
        refresh_handles(
            metas,
            Arc::clone(&self.handles),
            self.scheduler.clone(),
            self.referenced_uris(),
        )
        .await;
    }

    /// Display data for the entity in slot `index`
    ///
    /// `None` for literal or blank slots.
    #[must_use]
    pub fn reference_label(&self, index: usize) -> Option<ReferenceView> {
        let uri = self.store.get(index)?.uri().filter(|uri| !uri.is_empty())?;
        let handle = self.handles.lock().get(uri).cloned();

        let label = match handle.as_ref().map(|h| h.label_state()) {
            Some(Projection::Resolved(Some(label))) => label,
            Some(Projection::Resolved(None)) => uri.to_string(),
            Some(Projection::Pending) | None if self.metas.is_some() => LOADING_LABEL.to_string(),
            Some(Projection::Pending) | None => uri.to_string(),
        };
        let thumbnail = handle
            .as_ref()
            .and_then(|h| h.thumbnail_state().value().map(str::to_string));

        Some(ReferenceView {
            uri: uri.to_string(),
            label,
            thumbnail,
        })
    }

    /// Actions the field menu offers
    #[must_use]
    pub fn menu_buttons(&self) -> Vec<MenuButton> {
        let definition = self.store.definition();
        if !definition.translatable || definition.shape != ValueShape::Literal {
            return Vec::new();
        }
        if self.store.has_translations() {
            vec![MenuButton::RemoveTranslations]
        } else {
            vec![MenuButton::CreateTranslations]
        }
    }

    /// Open or close the field menu
    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
        self.scheduler.request_render();
    }

    /// Run a menu action and close the menu
    pub fn press_menu_button(&mut self, button: MenuButton) {
        self.menu_open = false;
        match button {
            MenuButton::CreateTranslations => self.enable_translations(),
            MenuButton::RemoveTranslations => self.remove_translations(),
        }
    }

    /// Open or close the detail area of slot `index`
    pub fn toggle_expanded(&mut self, index: usize) {
        if index >= self.store.render_count() {
            return;
        }
        if self.expanded.len() <= index {
            self.expanded.resize(index + 1, false);
        }
        self.expanded[index] = !self.expanded[index];
        self.scheduler.request_render();
    }

    /// Whether slot `index` has its detail area open
    #[must_use]
    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    /// Whether the field is required but its primary slot is blank
    #[must_use]
    pub fn is_missing_required(&self) -> bool {
        self.definition().required && self.store.get(0).map_or(true, ValueNode::is_blank)
    }

    /// View model of the whole field, as of now
    #[must_use]
    pub fn view(&self) -> FieldView {
        let definition = self.store.definition();
        let language = &self.store.languages().interface_language;

        let items = (0..self.store.render_count())
            .map(|index| {
                let suggestions = self.suggestions.results(index);
                self.widget.template_item(ItemContext {
                    store: &self.store,
                    index,
                    suggestions: &suggestions,
                    reference: self.reference_label(index),
                    expanded: self.is_expanded(index),
                })
            })
            .collect();

        FieldView {
            binding: definition.binding.clone(),
            widget: self.widget.type_name(),
            label: definition.display_label(language),
            description: definition.description.clone(),
            required: definition.required,
            has_translations: self.store.has_translations(),
            can_add: if self.store.has_translations() {
                self.store.another_translation_is_possible()
            } else {
                definition.multiple
            },
            menu_open: self.menu_open,
            menu_buttons: self.menu_buttons(),
            items,
        }
    }

    /// Values in wire shape, `None` when the attribute should be omitted
    #[must_use]
    pub fn serialize(&self) -> Option<Vec<Value>> {
        self.widget.serialize(&self.store)
    }
}

/// Bring `handles` in line with the cache for `uris`
///
/// A URI is re-resolved when the controller has no handle for it or the
/// cache no longer holds the same one.
async fn refresh_handles(metas: MetaCache, handles: HandleMap, scheduler: RenderScheduler, uris: Vec<String>) {
    let mut stale = Vec::new();
    for uri in uris {
        let cached = metas.get(&uri).await;
        let known = handles.lock().get(&uri).cloned();
        let current = matches!((&cached, &known), (Some(a), Some(b)) if Arc::ptr_eq(a, b));
        if !current {
            stale.push(uri);
        }
    }
    if stale.is_empty() {
        return;
    }

    let resolved = join_all(stale.iter().map(|uri| metas.resolve(uri))).await;
    {
        let mut handles = handles.lock();
        for (uri, handle) in stale.into_iter().zip(resolved) {
            let redraw = scheduler.clone();
            handle.watch(move || redraw.request_render());
            handles.insert(uri, handle);
        }
    }
    scheduler.request_render();
}

impl fmt::Debug for FieldController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldController")
            .field("binding", &self.definition().binding)
            .field("widget", &self.widget.type_name())
            .field("values", &self.store.len())
            .field("menu_open", &self.menu_open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{CheckboxWidget, ReferenceWidget, TextWidget};
    use pretty_assertions::assert_eq;
    use rdf_form_enrich::{ManualClock, RenderState};
    use rdf_form_test_utils::{
        en_fr, reference_field, store, text_field, FakeEntityLookup, FakePathFactory, BERLIN, PARIS,
    };
    use serde_json::json;
    use std::time::Duration;

    fn manual_scheduler() -> (RenderScheduler, ManualClock) {
        let clock = ManualClock::new();
        let scheduler = RenderScheduler::with_clock(Duration::from_millis(100), Arc::new(clock.clone()), Arc::new(|| {}));
        (scheduler, clock)
    }

    fn text_controller(definition: FieldDefinition, value: Option<&Value>) -> FieldController {
        let (scheduler, _) = manual_scheduler();
        FieldController::new(
            store(definition, en_fr(), value),
            Arc::new(TextWidget),
            &Services::new(),
            &FormConfig::default(),
            scheduler,
        )
    }

    #[test]
    fn input_event_mutates_and_emits() {
        let mut controller = text_controller(text_field("schema:name"), None);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        controller.subscribe(move |event| sink.lock().push(event.clone()));

        controller.handle_event(0, UiEvent::input("Paris"));

        let events = seen.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].index, 0);
        assert_eq!(events[0].value, "Paris");
        assert_eq!(events[0].original_event, UiEvent::input("Paris"));
        assert!(matches!(controller.scheduler().state(), RenderState::Pending { .. }));
    }

    #[test]
    fn ignored_event_requests_no_render() {
        let mut controller = text_controller(text_field("schema:name"), None);
        controller.handle_event(0, UiEvent::click(true));
        assert_eq!(controller.scheduler().state(), RenderState::Idle);
    }

    #[test]
    fn every_mutation_requests_render() {
        let clock = ManualClock::new();
        let scheduler = RenderScheduler::with_clock(Duration::from_millis(100), Arc::new(clock.clone()), Arc::new(|| {}));
        let mut controller = FieldController::new(
            store(text_field("schema:name").multiple(), en_fr(), None),
            Arc::new(TextWidget),
            &Services::new(),
            &FormConfig::default(),
            scheduler.clone(),
        );

        controller.add_item();
        controller.handle_event(0, UiEvent::input("a"));
        controller.add_item();
        controller.remove_item(1);
        controller.toggle_menu();
        clock.advance(Duration::from_millis(100));

        assert!(scheduler.tick());
        assert_eq!(scheduler.redraw_count(), 1);
    }

    #[test]
    fn menu_offers_translation_toggle() {
        let value = json!({"@value": "Paris"});
        let mut controller = text_controller(text_field("schema:name").translatable(), Some(&value));
        assert_eq!(controller.menu_buttons(), vec![MenuButton::CreateTranslations]);

        controller.toggle_menu();
        assert!(controller.view().menu_open);
        controller.press_menu_button(MenuButton::CreateTranslations);

        let view = controller.view();
        assert!(!view.menu_open);
        assert!(view.has_translations);
        assert_eq!(view.menu_buttons, vec![MenuButton::RemoveTranslations]);
        assert!(view.can_add);

        controller.press_menu_button(MenuButton::RemoveTranslations);
        assert_eq!(controller.serialize(), Some(vec![json!({"@value": "Paris"})]));
    }

    #[test]
    fn untranslatable_field_has_no_menu() {
        let controller = text_controller(text_field("schema:name"), None);
        assert!(controller.menu_buttons().is_empty());
    }

    #[test]
    fn view_shows_synthetic_slot() {
        let controller = text_controller(text_field("schema:name").required().with_label("en", "name"), None);
        let view = controller.view();

        assert_eq!(view.label, "Name");
        assert_eq!(view.items.len(), 1);
        assert!(view.items[0].required);
        assert!(controller.is_missing_required());
    }

    #[test]
    fn expanded_flags_follow_removal() {
        let value = json!([{"@value": "a"}, {"@value": "b"}, {"@value": "c"}]);
        let mut controller = text_controller(text_field("schema:name").multiple(), Some(&value));

        controller.toggle_expanded(2);
        controller.remove_item(1);

        assert!(controller.is_expanded(1));
        assert!(!controller.is_expanded(2));
    }

    #[test]
    fn checkbox_serializes_false_marker() {
        let (scheduler, _) = manual_scheduler();
        let controller = FieldController::new(
            store(text_field("ex:active").save_empty_value(), en_fr(), None),
            Arc::new(CheckboxWidget),
            &Services::new(),
            &FormConfig::default(),
            scheduler,
        );
        assert_eq!(controller.serialize(), Some(vec![json!({"@value": "false"})]));
    }

    #[test]
    fn build_rejects_unknown_widget() {
        let (scheduler, _) = manual_scheduler();
        let controller = FieldController::build(
            &WidgetRegistry::with_defaults(),
            store(text_field("ex:x").with_widget_type("slider"), en_fr(), None),
            &Services::new(),
            &FormConfig::default(),
            scheduler,
        );
        assert!(controller.is_none());
    }

    #[test]
    fn services_from_config_offer_free_text_lookup() {
        let services = Services::from_config(&FormConfig::default()).unwrap();
        assert!(services.entity_lookup.is_some());
        assert!(services.path_factory.is_none());

        let definition = reference_field("dbo:city").with_autocomplete(AutocompleteSource::FreeText);
        assert!(services.suggestion_source(&definition).is_some());
    }

    #[test]
    fn services_from_config_reject_bad_endpoint() {
        let mut config = FormConfig::default();
        config.lookup_endpoint = "not a url".to_string();
        assert!(matches!(Services::from_config(&config), Err(FormError::Lookup(_))));
    }

    #[test]
    fn reference_label_without_traversal_is_uri() {
        let (scheduler, _) = manual_scheduler();
        let value = json!({"@id": PARIS});
        let controller = FieldController::new(
            store(reference_field("dbo:city"), en_fr(), Some(&value)),
            Arc::new(ReferenceWidget),
            &Services::new(),
            &FormConfig::default(),
            scheduler,
        );

        let view = controller.reference_label(0).unwrap();
        assert_eq!(view.label, PARIS);
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_suggestion_resolves_label() {
        let lookup = FakeEntityLookup::new().with_answer("Paris", "Paris", PARIS);
        let factory = Arc::new(FakePathFactory::new().with_label(PARIS, "Paris, France"));
        let services = Services::new()
            .with_entity_lookup(Arc::new(lookup))
            .with_path_factory(factory.clone());
        let definition = reference_field("dbo:city").with_autocomplete(AutocompleteSource::FreeText);
        let (scheduler, _) = manual_scheduler();
        let mut controller = FieldController::new(
            store(definition, en_fr(), None),
            Arc::new(ReferenceWidget),
            &services,
            &FormConfig::default(),
            scheduler,
        );

        controller
            .handle_event(0, UiEvent::input("Paris"))
            .unwrap()
            .finished()
            .await;
        assert_eq!(controller.suggestions(0).len(), 1);

        controller.toggle_expanded(0);
        assert!(controller.select_suggestion(0, 0));
        assert!(controller.suggestions(0).is_empty());
        assert!(!controller.is_expanded(0));
        assert_eq!(controller.reference_label(0).unwrap().label, LOADING_LABEL);

        tokio::time::sleep(Duration::from_millis(10)).await;

        let reference = controller.reference_label(0).unwrap();
        assert_eq!(reference.label, "Paris, France");
        assert_eq!(reference.thumbnail, None);
        assert_eq!(factory.created(), 1);
        assert_eq!(controller.serialize(), Some(vec![json!({"@id": PARIS})]));
    }

    #[tokio::test(start_paused = true)]
    async fn record_references_resolve_on_construction() {
        let factory = Arc::new(FakePathFactory::new().with_label(PARIS, "Paris"));
        let services = Services::new().with_path_factory(factory.clone());
        let value = json!({"@id": PARIS});
        let (scheduler, _) = manual_scheduler();
        let controller = FieldController::new(
            store(reference_field("dbo:city"), en_fr(), Some(&value)),
            Arc::new(ReferenceWidget),
            &services,
            &FormConfig::default(),
            scheduler,
        );

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(controller.reference_label(0).unwrap().label, "Paris");
        assert_eq!(factory.created(), 1);
    }

    #[tokio::test]
    async fn handles_follow_store_references() {
        let factory = Arc::new(FakePathFactory::new());
        let services = Services::new().with_path_factory(factory);
        let value = json!([{"@id": PARIS}, {"@id": BERLIN}]);
        let (scheduler, _) = manual_scheduler();
        let mut controller = FieldController::new(
            store(reference_field("dbo:city").multiple(), en_fr(), Some(&value)),
            Arc::new(ReferenceWidget),
            &services,
            &FormConfig::default(),
            scheduler,
        );

        controller.update_metas().await;
        assert_eq!(controller.handles.lock().len(), 2);

        controller.remove_item(1);
        assert_eq!(controller.handles.lock().keys().collect::<Vec<_>>(), vec![PARIS]);

        controller.remove_reference(0);
        assert!(controller.handles.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn evicted_entity_is_resolved_again() {
        let factory = Arc::new(FakePathFactory::new());
        let services = Services::new().with_path_factory(factory.clone());
        let value = json!([{"@id": PARIS}, {"@id": BERLIN}]);
        let (scheduler, _) = manual_scheduler();
        let controller = FieldController::new(
            store(reference_field("dbo:city").multiple(), en_fr(), Some(&value)),
            Arc::new(ReferenceWidget),
            &services,
            &FormConfig::default().with_meta_cache_capacity(1),
            scheduler,
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        let metas = controller.metas().unwrap();
        assert_eq!(metas.len().await, 1);
        assert_eq!(factory.created(), 2);

        controller.update_metas().await;
        assert_eq!(factory.created(), 3);
    }
}
