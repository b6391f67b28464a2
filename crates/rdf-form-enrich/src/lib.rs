//! RDF Form Enrichment
//!
//! Asynchronous work that decorates form fields without blocking edits.
//!
//! # Core Operations
//!
//! - **Metadata**: [`MetaCache`] resolves the label and thumbnail of a
//!   referenced entity once per URI, shared by every field
//! - **Suggestions**: [`SuggestionEngine`] runs debounced searches per slot
//!   and discards results that arrive after a newer search started
//! - **Rendering**: [`RenderScheduler`] coalesces redraw requests into one
//!   redraw per quiet window
//!
//! # Architecture
//!
//! ```text
//! PathFactory ──▶ MetaCache (moka, single-flight) ──▶ TraversalHandle ─┐
//! QueryEngine ─┐                                                       ├─▶ RenderScheduler ──▶ redraw
//! EntityLookup ┴▶ SuggestionEngine (sequence-guarded slots) ───────────┘
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod dbpedia;
pub mod error;
pub mod meta_cache;
pub mod render;
pub mod service;
pub mod suggest;

pub use config::FormConfig;
pub use dbpedia::{parse_lookup_response, DbpediaLookup};
pub use error::{ConfigError, LookupError};
pub use meta_cache::{CacheStats, MetaCache, Projection, TraversalHandle};
pub use render::{Clock, ManualClock, RedrawFn, RenderDriver, RenderScheduler, RenderState, TokioClock};
pub use service::{literal_lexical, Bindings, EntityLookup, PathContext, PathFactory, PathNode, QueryConfig, QueryEngine, Term};
pub use suggest::{ResultsListener, SearchHandle, SearchSettings, Suggestion, SuggestionEngine, SuggestionSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring enrichment services
    pub use crate::config::FormConfig;
    pub use crate::error::{ConfigError, LookupError};
    pub use crate::meta_cache::{MetaCache, Projection, TraversalHandle};
    pub use crate::render::{RenderScheduler, RenderState};
    pub use crate::service::{EntityLookup, PathFactory, PathNode, QueryEngine};
    pub use crate::suggest::{SearchSettings, Suggestion, SuggestionEngine, SuggestionSource};
}
