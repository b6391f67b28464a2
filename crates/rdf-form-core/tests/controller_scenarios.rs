use pretty_assertions::assert_eq;
use rdf_form_core::{FieldController, LOADING_LABEL, Services, UiEvent, WidgetRegistry};
use rdf_form_enrich::{FormConfig, RenderScheduler};
use rdf_form_test_utils::{
    en_fr, reference_field, store, text_field, FakeEntityLookup, FakePathFactory, FakeQueryEngine, BERLIN, PARIS,
};
use rdf_form_value::{AutocompleteSource, FieldDefinition};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn counting_scheduler() -> (RenderScheduler, Arc<AtomicUsize>) {
    let redraws = Arc::new(AtomicUsize::new(0));
    let seen = redraws.clone();
    let scheduler = RenderScheduler::new(
        Duration::from_millis(100),
        Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }),
    );
    (scheduler, redraws)
}

fn controller(definition: FieldDefinition, value: Option<&Value>, services: &Services) -> FieldController {
    let (scheduler, _) = counting_scheduler();
    FieldController::build(
        &WidgetRegistry::with_defaults(),
        store(definition, en_fr(), value),
        services,
        &FormConfig::default(),
        scheduler,
    )
    .unwrap()
}

#[test]
fn add_translation_appends_unused_language() {
    let value = json!([{"@value": "Paris", "@language": "en"}]);
    let mut field = controller(text_field("schema:name").translatable(), Some(&value), &Services::new());

    field.add_translation();

    assert_eq!(
        field.serialize(),
        Some(vec![
            json!({"@value": "Paris", "@language": "en"}),
            json!({"@value": "", "@language": "fr"}),
        ])
    );
    assert!(!field.view().can_add);
}

#[tokio::test(start_paused = true)]
async fn short_search_initiates_nothing() {
    let lookup = Arc::new(FakeEntityLookup::new());
    let services = Services::new().with_entity_lookup(lookup.clone());
    let field = controller(
        reference_field("dbo:city").with_autocomplete(AutocompleteSource::FreeText),
        None,
        &services,
    );

    assert!(field.search(0, "ab").is_none());
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(lookup.calls().is_empty());
    assert!(field.suggestions(0).is_empty());
}

#[tokio::test(start_paused = true)]
async fn only_latest_search_is_stored() {
    let lookup = Arc::new(
        FakeEntityLookup::new()
            .with_answer("pari", "Pari", "http://dbpedia.org/resource/Pari")
            .with_answer("paris", "Paris", PARIS)
            .with_delay("pari", Duration::from_millis(800)),
    );
    let services = Services::new().with_entity_lookup(lookup.clone());
    let mut field = controller(
        reference_field("dbo:city").with_autocomplete(AutocompleteSource::FreeText),
        None,
        &services,
    );

    let first = field.handle_event(1, UiEvent::input("pari")).unwrap();
    let second = field.handle_event(1, UiEvent::input("paris")).unwrap();
    first.finished().await;
    second.finished().await;

    let results = field.suggestions(1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label(), "Paris");
    assert_eq!(lookup.calls(), vec!["paris".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn sparql_autocomplete_forwards_proxy() {
    let engine = Arc::new(FakeQueryEngine::new().with_literal("Blue", "blue"));
    let services = Services::new().with_query_engine(engine.clone());
    let definition = text_field("ex:colour").multiple().with_autocomplete(AutocompleteSource::Sparql {
        query: "SELECT ?label ?value WHERE { FILTER(langMatches(lang(?label), 'LANGUAGE')) }".to_string(),
        source: "https://example.org/sparql".to_string(),
    });
    let (scheduler, _) = counting_scheduler();
    let mut field = FieldController::build(
        &WidgetRegistry::with_defaults(),
        store(definition, en_fr(), None),
        &services,
        &FormConfig::default().with_proxy("http://proxy.local/"),
        scheduler,
    )
    .unwrap();

    field.search(0, "blu e").unwrap().finished().await;
    assert!(field.select_suggestion(0, 0));

    let queries = engine.queries();
    assert!(queries[0].0.contains("'en'"));
    assert_eq!(queries[0].1.proxy.as_deref(), Some("http://proxy.local/"));
    assert_eq!(field.serialize(), Some(vec![json!({"@value": "blue"})]));
}

#[tokio::test(start_paused = true)]
async fn burst_of_mutations_draws_once() {
    let (scheduler, redraws) = counting_scheduler();
    let _driver = scheduler.spawn_driver();
    let mut field = FieldController::build(
        &WidgetRegistry::with_defaults(),
        store(text_field("schema:name").multiple(), en_fr(), None),
        &Services::new(),
        &FormConfig::default(),
        scheduler.clone(),
    )
    .unwrap();

    for i in 0..10 {
        field.handle_event(0, UiEvent::input(format!("v{i}")));
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(redraws.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(redraws.load(Ordering::SeqCst), 1);
    assert_eq!(field.view().items[0].value, "v9");
}

#[tokio::test]
async fn shared_uri_resolves_through_one_pipeline() {
    let factory = Arc::new(
        FakePathFactory::new()
            .with_label(PARIS, "Paris")
            .with_label(BERLIN, "Berlin"),
    );
    let services = Services::new().with_path_factory(factory.clone());
    let value = json!([{"@id": PARIS}, {"@id": BERLIN}, {"@id": PARIS}]);
    let field = controller(reference_field("dbo:city").multiple(), Some(&value), &services);

    assert_eq!(field.reference_label(0).unwrap().label, LOADING_LABEL);
    field.update_metas().await;
    field.update_metas().await;
    assert_eq!(factory.created(), 2);

    let metas = field.metas().unwrap();
    let a = metas.resolve(PARIS).await;
    let b = metas.resolve(PARIS).await;
    assert!(Arc::ptr_eq(&a, &b));
    a.label().await;
    metas.resolve(BERLIN).await.label().await;

    assert_eq!(field.reference_label(0).unwrap().label, "Paris");
    assert_eq!(field.reference_label(1).unwrap().label, "Berlin");
    assert_eq!(field.reference_label(2).unwrap().label, "Paris");
    assert_eq!(metas.len().await, 2);
}

#[tokio::test]
async fn unresolvable_entity_falls_back_to_uri() {
    let factory = Arc::new(FakePathFactory::new());
    let services = Services::new().with_path_factory(factory);
    let value = json!({"@id": PARIS});
    let field = controller(reference_field("dbo:city"), Some(&value), &services);

    field.update_metas().await;
    field.metas().unwrap().resolve(PARIS).await.label().await;

    let reference = field.reference_label(0).unwrap();
    assert_eq!(reference.label, PARIS);
    assert_eq!(reference.thumbnail, None);
}

#[tokio::test]
async fn remove_reference_blanks_slot() {
    let value = json!({"@id": PARIS});
    let mut field = controller(reference_field("dbo:city"), Some(&value), &Services::new());

    field.remove_reference(0);

    assert!(field.reference_label(0).is_none());
    assert_eq!(field.serialize(), Some(vec![json!({"@id": ""})]));
}

#[tokio::test(start_paused = true)]
async fn selected_entity_label_resolves_without_host_help() {
    let lookup = Arc::new(FakeEntityLookup::new().with_answer("paris", "Paris", PARIS));
    let factory = Arc::new(
        FakePathFactory::new()
            .with_label(PARIS, "Paris")
            .with_delay(Duration::from_millis(500)),
    );
    let services = Services::new()
        .with_entity_lookup(lookup)
        .with_path_factory(factory.clone());
    let mut field = controller(
        reference_field("dbo:city").with_autocomplete(AutocompleteSource::FreeText),
        None,
        &services,
    );

    field.handle_event(0, UiEvent::input("paris")).unwrap().finished().await;
    assert!(field.select_suggestion(0, 0));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(field.reference_label(0).unwrap().label, LOADING_LABEL);
    assert_eq!(factory.created(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(field.reference_label(0).unwrap().label, "Paris");
    assert!(factory.walks() >= 1);
}

#[tokio::test(start_paused = true)]
async fn sparql_reference_candidate_sets_uri() {
    let engine = Arc::new(FakeQueryEngine::new().with_reference("Paris", PARIS));
    let services = Services::new().with_query_engine(engine);
    let mut field = controller(
        reference_field("dbo:city").with_autocomplete(AutocompleteSource::Sparql {
            query: "SELECT ?label ?uri WHERE {}".to_string(),
            source: "https://dbpedia.org/sparql".to_string(),
        }),
        None,
        &services,
    );

    field.search(0, "paris").unwrap().finished().await;
    assert_eq!(field.suggestions(0)[0].label(), "Paris");
    assert!(field.select_suggestion(0, 0));

    assert_eq!(field.serialize(), Some(vec![json!({"@id": PARIS})]));
}

#[tokio::test(start_paused = true)]
async fn failed_search_leaves_no_suggestions() {
    let engine = Arc::new(FakeQueryEngine::failing());
    let services = Services::new().with_query_engine(engine.clone());
    let mut field = controller(
        text_field("ex:colour").with_autocomplete(AutocompleteSource::Sparql {
            query: "SELECT ?label ?value WHERE {}".to_string(),
            source: "https://example.org/sparql".to_string(),
        }),
        None,
        &services,
    );

    field.search(0, "blue").unwrap().finished().await;

    assert_eq!(engine.queries().len(), 1);
    assert!(field.suggestions(0).is_empty());
    assert!(!field.select_suggestion(0, 0));
}
