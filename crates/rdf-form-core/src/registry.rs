//! Widget registry
//!
//! Maps a field's type string to its widget variant. Widgets are stateless,
//! so the registry hands out shared instances.

use crate::error::FormError;
use crate::widgets::{CheckboxWidget, ColorWidget, ReferenceWidget, TextWidget, Widget};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of widget variants by type name
#[derive(Default, Clone)]
pub struct WidgetRegistry {
    widgets: HashMap<String, Arc<dyn Widget>>,
}

impl WidgetRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            widgets: HashMap::new(),
        }
    }

    /// Create registry with the built-in variants
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextWidget));
        registry.register(Arc::new(ColorWidget));
        registry.register(Arc::new(CheckboxWidget));
        registry.register(Arc::new(ReferenceWidget));
        registry
    }

    /// Register a widget under its own type name, replacing any previous one
    pub fn register(&mut self, widget: Arc<dyn Widget>) {
        self.register_as(widget.type_name(), widget);
    }

    /// Register a widget under an alias
    pub fn register_as(&mut self, name: &str, widget: Arc<dyn Widget>) {
        self.widgets.insert(name.to_string(), widget);
    }

    /// Widget for `type_name`
    ///
    /// Unknown types are logged and yield `None`; the field is then simply
    /// not rendered.
    #[must_use]
    pub fn create(&self, type_name: &str) -> Option<Arc<dyn Widget>> {
        self.try_create(type_name)
            .map_err(|err| tracing::error!(%err, "cannot create widget"))
            .ok()
    }

    /// Like [`WidgetRegistry::create`], as an error
    ///
    /// # Errors
    /// Returns [`FormError::UnknownWidget`] for unregistered types
    pub fn try_create(&self, type_name: &str) -> Result<Arc<dyn Widget>, FormError> {
        self.widgets
            .get(type_name)
            .cloned()
            .ok_or_else(|| FormError::UnknownWidget(type_name.to_string()))
    }

    /// Check if a type is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.widgets.contains_key(type_name)
    }

    /// Registered type names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.widgets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get number of registered types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("types", &self.names())
            .finish()
    }
}
