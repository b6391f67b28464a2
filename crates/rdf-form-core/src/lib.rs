//! RDF Form Core
//!
//! Widget controllers that keep one record attribute's values consistent
//! while users edit them and lookups land asynchronously.
//!
//! # Core Concepts
//!
//! - [`Widget`]: capability interface of a widget variant, with shared
//!   default behaviour
//! - [`WidgetRegistry`]: type string to variant
//! - [`FieldController`]: per-attribute orchestrator of store, lookups,
//!   events and redraws
//! - [`Form`]: controllers of a whole record
//!
//! # Architecture
//!
//! ```text
//! UiEvent ──▶ Widget::on ──▶ FieldValueStore ──▶ FieldEvent listeners
//!                 │                  │
//!                 ▼                  ▼
//!         SuggestionEngine    RenderScheduler ──▶ redraw ──▶ FieldController::view
//!                 MetaCache ─────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use rdf_form_core::prelude::*;
//! use rdf_form_value::{FieldDefinition, FieldValueStore, LanguageConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let definition = Arc::new(FieldDefinition::new("schema:name").multiple());
//! let store = FieldValueStore::from_json(definition, LanguageConfig::default(), None);
//! let scheduler = RenderScheduler::new(Duration::from_millis(100), Arc::new(|| {}));
//!
//! let mut field = FieldController::build(
//!     &WidgetRegistry::with_defaults(),
//!     store,
//!     &Services::new(),
//!     &FormConfig::default(),
//!     scheduler,
//! )
//! .expect("text widget is registered");
//!
//! field.handle_event(0, UiEvent::input("Paris"));
//! field.add_item();
//! assert_eq!(field.view().items.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod controller;
pub mod error;
pub mod form;
pub mod registry;
pub mod widgets;

pub use controller::{EventListener, FieldController, FieldView, MenuButton, Services, LOADING_LABEL};
pub use error::FormError;
pub use form::{load_config, parse_definitions, read_json, Form};
pub use registry::WidgetRegistry;
pub use widgets::{
    default_item, FieldEvent, InputKind, ItemContext, ItemView, LanguageOption, Reaction, ReferenceView, UiEvent,
    UiEventKind, Widget,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting form fields
    pub use crate::controller::{FieldController, FieldView, MenuButton, Services};
    pub use crate::error::FormError;
    pub use crate::form::Form;
    pub use crate::registry::WidgetRegistry;
    pub use crate::widgets::{FieldEvent, ItemView, UiEvent, Widget};
    pub use rdf_form_enrich::{FormConfig, RenderScheduler};
}
