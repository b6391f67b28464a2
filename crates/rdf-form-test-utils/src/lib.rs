//! Testing utilities for the RDF form workspace
//!
//! In-memory stand-ins for the query engine, the entity traversal library
//! and the free-text lookup, plus fixture builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rdf_form_enrich::{
    Bindings, EntityLookup, LookupError, PathContext, PathFactory, PathNode, QueryConfig, QueryEngine, Suggestion,
    Term,
};
use rdf_form_value::{FieldDefinition, FieldValueStore, LanguageConfig, ValueShape};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PARIS: &str = "http://dbpedia.org/resource/Paris";
pub const BERLIN: &str = "http://dbpedia.org/resource/Berlin";

pub fn en_fr() -> LanguageConfig {
    LanguageConfig::new("en", [("en", "English"), ("fr", "French")])
}

pub fn en_fr_de() -> LanguageConfig {
    LanguageConfig::new("en", [("en", "English"), ("fr", "French"), ("de", "German")])
}

pub fn text_field(binding: &str) -> FieldDefinition {
    FieldDefinition::new(binding)
}

pub fn reference_field(binding: &str) -> FieldDefinition {
    FieldDefinition::new(binding)
        .with_widget_type("reference")
        .with_shape(ValueShape::Reference)
}

pub fn store(definition: FieldDefinition, languages: LanguageConfig, value: Option<&Value>) -> FieldValueStore {
    FieldValueStore::from_json(Arc::new(definition), languages, value)
}

/// Query engine answering every query with the same solutions
#[derive(Default)]
pub struct FakeQueryEngine {
    solutions: Vec<Bindings>,
    fail: bool,
    queries: Mutex<Vec<(String, QueryConfig)>>,
}

impl FakeQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Add a `?label ?uri` solution
    pub fn with_reference(mut self, label: &str, uri: &str) -> Self {
        self.solutions.push(Bindings::from([
            ("label".to_string(), format!("\"{label}\"")),
            ("uri".to_string(), uri.to_string()),
        ]));
        self
    }

    /// Add a `?label ?value` solution
    pub fn with_literal(mut self, label: &str, value: &str) -> Self {
        self.solutions.push(Bindings::from([
            ("label".to_string(), format!("\"{label}\"")),
            ("value".to_string(), format!("\"{value}\"")),
        ]));
        self
    }

    pub fn queries(&self) -> Vec<(String, QueryConfig)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl QueryEngine for FakeQueryEngine {
    async fn query(&self, query: &str, config: &QueryConfig) -> Result<Vec<Bindings>, LookupError> {
        self.queries.lock().push((query.to_string(), config.clone()));
        if self.fail {
            return Err(LookupError::QueryFailed("fake engine failure".to_string()));
        }
        Ok(self.solutions.clone())
    }
}

/// Relations of one subject
pub type Relations = HashMap<String, Vec<Term>>;

/// Path factory over an in-memory graph
#[derive(Default)]
pub struct FakePathFactory {
    graph: HashMap<String, Relations>,
    delay: Option<Duration>,
    created: AtomicUsize,
    walks: Arc<AtomicUsize>,
}

impl FakePathFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, subject: &str, predicate: &str, terms: Vec<Term>) -> Self {
        self.graph
            .entry(subject.to_string())
            .or_default()
            .insert(predicate.to_string(), terms);
        self
    }

    /// Add a subject with an untagged `rdfs:label`
    pub fn with_label(self, subject: &str, label: &str) -> Self {
        self.with_entity(subject, "rdfs:label", vec![Term::plain(label)])
    }

    /// Delay every relation lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of pipelines built
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of relation lookups across all pipelines
    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }
}

impl PathFactory for FakePathFactory {
    fn create(&self, subject: &str, _context: &PathContext, _proxy: Option<&str>) -> Arc<dyn PathNode> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(FakePath {
            subject: subject.to_string(),
            relations: self.graph.get(subject).cloned().unwrap_or_default(),
            delay: self.delay,
            walks: Arc::clone(&self.walks),
        })
    }
}

struct FakePath {
    subject: String,
    relations: Relations,
    delay: Option<Duration>,
    walks: Arc<AtomicUsize>,
}

#[async_trait]
impl PathNode for FakePath {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn values(&self, predicate: &str) -> Result<Vec<Term>, LookupError> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.relations.get(predicate).cloned().unwrap_or_default())
    }
}

/// Free-text lookup with canned answers and per-term latency
#[derive(Default)]
pub struct FakeEntityLookup {
    answers: HashMap<String, Vec<Suggestion>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeEntityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, term: &str, label: &str, uri: &str) -> Self {
        self.answers.entry(term.to_string()).or_default().push(Suggestion::Reference {
            label: label.to_string(),
            uri: uri.to_string(),
            image: None,
        });
        self
    }

    pub fn with_delay(mut self, term: &str, delay: Duration) -> Self {
        self.delays.insert(term.to_string(), delay);
        self
    }

    /// Terms looked up, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EntityLookup for FakeEntityLookup {
    async fn lookup(&self, term: &str) -> Result<Vec<Suggestion>, LookupError> {
        self.calls.lock().push(term.to_string());
        if let Some(delay) = self.delays.get(term) {
            tokio::time::sleep(*delay).await;
        }
        Ok(self.answers.get(term).cloned().unwrap_or_default())
    }
}
