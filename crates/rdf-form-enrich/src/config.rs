//! Enrichment configuration

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every field of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Coalescing window for redraw requests
    pub render_window_ms: u64,
    /// Quiet period before a suggestion search fires
    pub search_debounce_ms: u64,
    /// Shortest search term that triggers a lookup
    pub min_search_len: usize,
    /// Upper bound of distinct URIs kept by a field's metadata cache
    pub meta_cache_capacity: u64,
    /// Network proxy forwarded to lookups
    pub proxy: Option<String>,
    /// Prefix to namespace mapping for path traversal
    pub path_context: IndexMap<String, String>,
    /// Label relations, in priority order
    pub label_predicates: Vec<String>,
    /// Thumbnail relations, in priority order
    pub thumbnail_predicates: Vec<String>,
    /// Free-text lookup endpoint
    pub lookup_endpoint: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        let path_context = [
            ("schema", "http://schema.org/"),
            ("dbo", "http://dbpedia.org/ontology/"),
            ("dbp", "http://dbpedia.org/property/"),
            ("foaf", "http://xmlns.com/foaf/0.1/"),
            ("dc", "http://purl.org/dc/terms/"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ]
        .into_iter()
        .map(|(prefix, ns)| (prefix.to_string(), ns.to_string()))
        .collect();

        Self {
            render_window_ms: 100,
            search_debounce_ms: 300,
            min_search_len: 4,
            meta_cache_capacity: 10_000,
            proxy: None,
            path_context,
            label_predicates: ["rdfs:label", "foaf:name", "schema:name"]
                .map(String::from)
                .to_vec(),
            thumbnail_predicates: ["dbo:thumbnail", "foaf:depiction", "schema:image"]
                .map(String::from)
                .to_vec(),
            lookup_endpoint: "https://lookup.dbpedia.org/api/prefix".to_string(),
        }
    }
}

impl FormConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML, filling unspecified keys with defaults
    ///
    /// # Errors
    /// Returns [`ConfigError`] on syntax errors or invalid values
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for zero-length thresholds or
    /// an empty cache
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_search_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_search_len",
                message: "must be at least 1".to_string(),
            });
        }
        if self.meta_cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "meta_cache_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// With render window
    #[inline]
    #[must_use]
    pub fn with_render_window_ms(mut self, ms: u64) -> Self {
        self.render_window_ms = ms;
        self
    }

    /// With search debounce
    #[inline]
    #[must_use]
    pub fn with_search_debounce_ms(mut self, ms: u64) -> Self {
        self.search_debounce_ms = ms;
        self
    }

    /// With proxy
    #[inline]
    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// With metadata cache capacity
    #[inline]
    #[must_use]
    pub fn with_meta_cache_capacity(mut self, capacity: u64) -> Self {
        self.meta_cache_capacity = capacity;
        self
    }

    /// Coalescing window as a duration
    #[inline]
    #[must_use]
    pub fn render_window(&self) -> Duration {
        Duration::from_millis(self.render_window_ms)
    }

    /// Search debounce as a duration
    #[inline]
    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
