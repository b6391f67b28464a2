//! Debounced autocomplete suggestions
//!
//! [`SuggestionEngine`] keeps the latest result list per editable slot.
//! Every search takes a fresh sequence number for its slot; a result is
//! written only while its sequence is still the newest for that slot, so a
//! superseded search (or one outrun by `clear`) can never clobber newer
//! state, whatever order the transport answers in.

use crate::error::LookupError;
use crate::service::{literal_lexical, Bindings, EntityLookup, QueryConfig, QueryEngine};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// One autocomplete candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestion {
    /// Entity candidate
    Reference {
        /// Display label
        label: String,
        /// Entity URI
        uri: String,
        /// Thumbnail URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },
    /// Literal candidate
    Literal {
        /// Display label
        label: String,
        /// Value to store
        value: String,
    },
}

impl Suggestion {
    /// Display label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Reference { label, .. } | Self::Literal { label, .. } => label,
        }
    }

    /// Build from one query solution (`?label`, `?uri`, `?image` or `?value`)
    #[must_use]
    pub fn from_bindings(bindings: &Bindings) -> Option<Self> {
        let label = bindings.get("label").map(|l| literal_lexical(l).to_string());
        if let Some(uri) = bindings.get("uri") {
            return Some(Self::Reference {
                label: label.unwrap_or_else(|| uri.clone()),
                uri: uri.clone(),
                image: bindings.get("image").cloned(),
            });
        }
        let value = literal_lexical(bindings.get("value")?).to_string();
        Some(Self::Literal {
            label: label.unwrap_or_else(|| value.clone()),
            value,
        })
    }
}

/// Where a field's suggestions come from
#[derive(Clone)]
pub enum SuggestionSource {
    /// Parameterised SPARQL query
    Sparql {
        /// Execution service
        engine: Arc<dyn QueryEngine>,
        /// Query template with `LANGUAGE` / `SEARCH_TERM` placeholders
        query: String,
        /// Source template with a `SEARCH_TERM` placeholder
        source: String,
    },
    /// Free-text entity lookup
    FreeText(Arc<dyn EntityLookup>),
}

impl SuggestionSource {
    async fn fetch(
        &self,
        term: &str,
        language: &str,
        proxy: Option<&str>,
    ) -> Result<Vec<Suggestion>, LookupError> {
        match self {
            Self::Sparql {
                engine,
                query,
                source,
            } => {
                let query = query
                    .replace("LANGUAGE", language)
                    .replace("SEARCH_TERM", term);
                let config = QueryConfig {
                    sources: vec![source.replace("SEARCH_TERM", term)],
                    proxy: proxy.map(str::to_string),
                };
                let bindings = engine.query(&query, &config).await?;
                Ok(bindings.iter().filter_map(Suggestion::from_bindings).collect())
            }
            Self::FreeText(lookup) => lookup.lookup(term).await,
        }
    }
}

impl fmt::Debug for SuggestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sparql { query, source, .. } => f
                .debug_struct("Sparql")
                .field("query", query)
                .field("source", source)
                .finish_non_exhaustive(),
            Self::FreeText(_) => f.write_str("FreeText"),
        }
    }
}

/// Search tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Shortest term that triggers a lookup, in characters
    pub min_len: usize,
    /// Quiet period before the lookup fires
    pub debounce: Duration,
    /// Language substituted for `LANGUAGE`
    pub language: String,
    /// Proxy forwarded to the query engine
    pub proxy: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_len: 4,
            debounce: Duration::from_millis(300),
            language: "en".to_string(),
            proxy: None,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    latest: u64,
    results: Vec<Suggestion>,
}

type Slots = Arc<Mutex<HashMap<usize, Slot>>>;

/// Callback invoked after results were stored
pub type ResultsListener = Arc<dyn Fn() + Send + Sync>;

/// A started search
#[derive(Debug)]
pub struct SearchHandle {
    index: usize,
    sequence: u64,
    task: JoinHandle<()>,
}

impl SearchHandle {
    /// Slot searched
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sequence number within the slot
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Wait until the search has stored or discarded its result
    pub async fn finished(self) {
        if let Err(err) = self.task.await {
            tracing::warn!(index = self.index, %err, "suggestion task ended abnormally");
        }
    }
}

/// Per-slot suggestion results
#[derive(Clone)]
pub struct SuggestionEngine {
    slots: Slots,
    source: Option<SuggestionSource>,
    settings: SearchSettings,
    listener: Option<ResultsListener>,
}

impl SuggestionEngine {
    /// Create engine; without a source every search is a no-op
    #[must_use]
    pub fn new(source: Option<SuggestionSource>, settings: SearchSettings) -> Self {
        Self {
            slots: Arc::default(),
            source,
            settings,
            listener: None,
        }
    }

    /// With a callback run whenever a result is stored
    #[must_use]
    pub fn with_listener(mut self, listener: ResultsListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Whether a source is configured
    #[inline]
    #[must_use]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Start a debounced search for slot `index`
    ///
    /// Returns `None` without touching the slot when `term` is shorter than
    /// the threshold or no source is configured. Must be called within a
    /// tokio runtime.
    pub fn search(&self, index: usize, term: &str) -> Option<SearchHandle> {
        if term.chars().count() < self.settings.min_len {
            tracing::trace!(index, term, "search term below threshold");
            return None;
        }
        let source = self.source.clone()?;

        let sequence = {
            let mut slots = self.slots.lock();
            let slot = slots.entry(index).or_default();
            slot.latest += 1;
            slot.latest
        };

        let slots = Arc::clone(&self.slots);
        let settings = self.settings.clone();
        let listener = self.listener.clone();
        let term = term.to_string();

        let task = tokio::spawn(async move {
            if !settings.debounce.is_zero() {
                tokio::time::sleep(settings.debounce).await;
            }
            if !is_latest(&slots, index, sequence) {
                tracing::trace!(index, sequence, "search superseded before firing");
                return;
            }

            let results = match source
                .fetch(&term, &settings.language, settings.proxy.as_deref())
                .await
            {
                Ok(results) => results,
                Err(err) => {
                    tracing::warn!(index, term = %term, %err, "suggestion lookup failed");
                    Vec::new()
                }
            };

            let stored = {
                let mut slots = slots.lock();
                match slots.get_mut(&index) {
                    Some(slot) if slot.latest == sequence => {
                        slot.results = results;
                        true
                    }
                    _ => false,
                }
            };

            if stored {
                if let Some(listener) = listener {
                    listener();
                }
            } else {
                tracing::debug!(index, sequence, "discarding stale suggestions");
            }
        });

        Some(SearchHandle {
            index,
            sequence,
            task,
        })
    }

    /// Latest results for slot `index`
    #[must_use]
    pub fn results(&self, index: usize) -> Vec<Suggestion> {
        self.slots
            .lock()
            .get(&index)
            .map(|slot| slot.results.clone())
            .unwrap_or_default()
    }

    /// Empty the results of slot `index` and invalidate in-flight searches
    pub fn clear(&self, index: usize) {
        let mut slots = self.slots.lock();
        let slot = slots.entry(index).or_default();
        slot.latest += 1;
        slot.results.clear();
    }

    /// Empty every slot
    pub fn clear_all(&self) {
        for slot in self.slots.lock().values_mut() {
            slot.latest += 1;
            slot.results.clear();
        }
    }

    /// Candidate `position` of slot `index`, for the caller to apply
    #[must_use]
    pub fn select(&self, index: usize, position: usize) -> Option<Suggestion> {
        self.slots
            .lock()
            .get(&index)
            .and_then(|slot| slot.results.get(position).cloned())
    }
}

impl fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field("source", &self.source)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn is_latest(slots: &Slots, index: usize, sequence: u64) -> bool {
    slots
        .lock()
        .get(&index)
        .is_some_and(|slot| slot.latest == sequence)
}
