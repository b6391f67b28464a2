//! Per-field cache of entity metadata
//!
//! Maps each reference URI to one [`TraversalHandle`]. The cache is built on
//! moka's single-flight `get_with`, so concurrent first requests for a URI
//! still construct exactly one traversal pipeline.
//!
//! Entries live as long as the owning field. The capacity bound only matters
//! for very long-lived fields; an evicted URI gets a fresh handle on its next
//! request.

use crate::config::FormConfig;
use crate::service::{PathContext, PathFactory, PathNode, Term};
use moka::future::Cache;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Resolution state of one projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Not resolved yet
    Pending,
    /// Resolved; `None` when no candidate relation yielded a value
    Resolved(Option<String>),
}

impl Projection {
    /// Whether still pending
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Resolved value, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Resolved(Some(value)) => Some(value),
            _ => None,
        }
    }
}

/// Lazy handle resolving the label and thumbnail of one entity
pub struct TraversalHandle {
    path: Arc<dyn PathNode>,
    language: String,
    label_predicates: Arc<[String]>,
    thumbnail_predicates: Arc<[String]>,
    label: OnceCell<Option<String>>,
    thumbnail: OnceCell<Option<String>>,
    watching: AtomicBool,
}

impl TraversalHandle {
    fn new(
        path: Arc<dyn PathNode>,
        language: String,
        label_predicates: Arc<[String]>,
        thumbnail_predicates: Arc<[String]>,
    ) -> Self {
        Self {
            path,
            language,
            label_predicates,
            thumbnail_predicates,
            label: OnceCell::new(),
            thumbnail: OnceCell::new(),
            watching: AtomicBool::new(false),
        }
    }

    /// Subject URI
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &str {
        self.path.subject()
    }

    /// Display label, resolved once
    pub async fn label(&self) -> Option<String> {
        self.label
            .get_or_init(|| first_value(&*self.path, &self.label_predicates, &self.language))
            .await
            .clone()
    }

    /// Thumbnail URL, resolved once
    pub async fn thumbnail(&self) -> Option<String> {
        self.thumbnail
            .get_or_init(|| first_value(&*self.path, &self.thumbnail_predicates, &self.language))
            .await
            .clone()
    }

    /// Label state without waiting
    #[must_use]
    pub fn label_state(&self) -> Projection {
        self.label
            .get()
            .map_or(Projection::Pending, |value| Projection::Resolved(value.clone()))
    }

    /// Thumbnail state without waiting
    #[must_use]
    pub fn thumbnail_state(&self) -> Projection {
        self.thumbnail
            .get()
            .map_or(Projection::Pending, |value| Projection::Resolved(value.clone()))
    }

    /// Resolve both projections in the background, then call `on_ready`
    ///
    /// Only the first call per handle spawns; later calls return `false`.
    /// Must be called within a tokio runtime.
    pub fn watch(self: &Arc<Self>, on_ready: impl FnOnce() + Send + 'static) -> bool {
        if self.watching.swap(true, Ordering::AcqRel) {
            return false;
        }
        let handle = Arc::clone(self);
        tokio::spawn(async move {
            futures::join!(handle.label(), handle.thumbnail());
            tracing::trace!(uri = handle.uri(), "entity metadata resolved");
            on_ready();
        });
        true
    }
}

impl fmt::Debug for TraversalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalHandle")
            .field("uri", &self.uri())
            .field("label", &self.label_state())
            .field("thumbnail", &self.thumbnail_state())
            .finish_non_exhaustive()
    }
}

/// Walk `predicates` in order, taking the first that yields a value
///
/// Within one relation a value tagged with `language` wins over an untagged
/// one, which wins over any other. Failing relations are skipped.
async fn first_value(path: &dyn PathNode, predicates: &[String], language: &str) -> Option<String> {
    for predicate in predicates {
        match path.values(predicate).await {
            Ok(terms) => {
                if let Some(term) = preferred(&terms, language) {
                    return Some(term.value.clone());
                }
            }
            Err(err) => {
                tracing::warn!(subject = path.subject(), predicate = %predicate, %err, "relation lookup failed");
            }
        }
    }
    None
}

fn preferred<'a>(terms: &'a [Term], language: &str) -> Option<&'a Term> {
    terms
        .iter()
        .find(|t| t.language.as_deref() == Some(language))
        .or_else(|| terms.iter().find(|t| t.language.is_none()))
        .or_else(|| terms.first())
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached handles
    pub entry_count: u64,
}

/// Memoised traversal handles keyed by URI
#[derive(Clone)]
pub struct MetaCache {
    inner: Cache<String, Arc<TraversalHandle>>,
    factory: Arc<dyn PathFactory>,
    context: Arc<PathContext>,
    proxy: Option<String>,
    label_predicates: Arc<[String]>,
    thumbnail_predicates: Arc<[String]>,
}

impl MetaCache {
    /// Create cache for one field
    pub fn new(factory: Arc<dyn PathFactory>, config: &FormConfig, language: &str) -> Self {
        Self {
            inner: Cache::new(config.meta_cache_capacity),
            factory,
            context: Arc::new(PathContext::new(config.path_context.clone(), language)),
            proxy: config.proxy.clone(),
            label_predicates: config.label_predicates.clone().into(),
            thumbnail_predicates: config.thumbnail_predicates.clone().into(),
        }
    }

    /// Handle for `uri`, constructing its pipeline on first request
    pub async fn resolve(&self, uri: &str) -> Arc<TraversalHandle> {
        self.inner
            .get_with(uri.to_string(), async {
                tracing::debug!(uri, "creating traversal pipeline");
                let path = self.factory.create(uri, &self.context, self.proxy.as_deref());
                Arc::new(TraversalHandle::new(
                    path,
                    self.context.language.clone(),
                    Arc::clone(&self.label_predicates),
                    Arc::clone(&self.thumbnail_predicates),
                ))
            })
            .await
    }

    /// Handle for `uri` if already cached
    pub async fn get(&self, uri: &str) -> Option<Arc<TraversalHandle>> {
        self.inner.get(uri).await
    }

    /// Cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks().await;
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Number of distinct URIs resolved so far
    pub async fn len(&self) -> u64 {
        self.stats().await.entry_count
    }

    /// Whether no URI was resolved yet
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for MetaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaCache")
            .field("entries", &self.inner.entry_count())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
