//! External lookup services
//!
//! The query engine, the entity traversal library, and the free-text lookup
//! are consumed as opaque services behind these traits. Implementations must
//! tolerate concurrent independent calls from many fields.

use crate::error::LookupError;
use crate::suggest::Suggestion;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// One solution of a query: variable name (without `?`) to term
///
/// Literal terms use their N-Triples form (`"Paris"@en`), IRIs are bare.
pub type Bindings = HashMap<String, String>;

/// Source and transport settings for one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryConfig {
    /// Sources to query (endpoints or documents)
    pub sources: Vec<String>,
    /// HTTP proxy to route through
    pub proxy: Option<String>,
}

/// Query execution service
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute `query` and return its solutions in order
    async fn query(&self, query: &str, config: &QueryConfig) -> Result<Vec<Bindings>, LookupError>;
}

/// Term reached by following a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    /// Lexical value or IRI
    pub value: String,
    /// Language tag of a literal
    pub language: Option<String>,
}

impl Term {
    /// Untagged term
    #[inline]
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    /// Language-tagged literal
    #[inline]
    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into()),
        }
    }
}

/// Prefixes and preferred language for path traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathContext {
    /// Prefix to namespace
    pub prefixes: IndexMap<String, String>,
    /// Preferred literal language
    pub language: String,
}

impl PathContext {
    /// Create context
    pub fn new(prefixes: IndexMap<String, String>, language: impl Into<String>) -> Self {
        Self {
            prefixes,
            language: language.into(),
        }
    }
}

/// Lazy path rooted at one subject
#[async_trait]
pub trait PathNode: Send + Sync {
    /// Subject IRI
    fn subject(&self) -> &str;

    /// Objects reachable through `predicate` (a CURIE or IRI)
    async fn values(&self, predicate: &str) -> Result<Vec<Term>, LookupError>;
}

/// Entity traversal factory
pub trait PathFactory: Send + Sync {
    /// Build a lazy path for `subject`; no I/O happens until it is walked
    fn create(&self, subject: &str, context: &PathContext, proxy: Option<&str>) -> Arc<dyn PathNode>;
}

/// Free-text entity lookup service
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Candidates matching `term`
    async fn lookup(&self, term: &str) -> Result<Vec<Suggestion>, LookupError>;
}

/// Strip the quotes and tag/datatype suffix from an N-Triples literal
///
/// Anything that is not a quoted literal is returned unchanged.
#[must_use]
pub fn literal_lexical(term: &str) -> &str {
    let mut parts = term.split('"');
    match (parts.next(), parts.next()) {
        (Some(""), Some(lexical)) => lexical,
        _ => term,
    }
}
