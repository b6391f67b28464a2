//! Whole-record form
//!
//! Builds one [`FieldController`] per field definition against a JSON-LD
//! record and aggregates their serialisation.

use crate::controller::{FieldController, Services};
use crate::error::FormError;
use crate::registry::WidgetRegistry;
use rdf_form_enrich::{FormConfig, RedrawFn, RenderScheduler};
use rdf_form_value::{FieldDefinition, FieldValueStore, LanguageConfig};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Read a JSON document from `path`
///
/// # Errors
/// Returns [`FormError::Io`] when the file cannot be read and
/// [`FormError::Json`] when it is not JSON
pub fn read_json(path: &Path) -> Result<Value, FormError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Decode a JSON array of field definitions
///
/// # Errors
/// Returns [`FormError::Json`] for anything that is not such an array
pub fn parse_definitions(value: Value) -> Result<Vec<FieldDefinition>, FormError> {
    Ok(serde_json::from_value(value)?)
}

/// Load form configuration from a TOML file
///
/// # Errors
/// Returns [`FormError::Io`] when the file cannot be read and
/// [`FormError::Config`] for invalid configuration
pub fn load_config(path: &Path) -> Result<FormConfig, FormError> {
    let text = std::fs::read_to_string(path)?;
    Ok(FormConfig::from_toml_str(&text)?)
}

/// Controllers of one record, in definition order
#[derive(Debug)]
pub struct Form {
    fields: Vec<FieldController>,
}

impl Form {
    /// Build controllers for `definitions` over `record`
    ///
    /// Fields whose widget type is unknown are skipped. Every field gets its
    /// own render scheduler calling `redraw`.
    ///
    /// # Errors
    /// Returns [`FormError::InvalidRecord`] when `record` is not an object
    pub fn build(
        record: &Value,
        definitions: Vec<FieldDefinition>,
        languages: &LanguageConfig,
        registry: &WidgetRegistry,
        services: &Services,
        config: &FormConfig,
        redraw: &RedrawFn,
    ) -> Result<Self, FormError> {
        let record = record
            .as_object()
            .ok_or_else(|| FormError::InvalidRecord("expected a JSON object".to_string()))?;

        let fields = definitions
            .into_iter()
            .filter_map(|definition| {
                let value = record.get(&definition.binding);
                let store = FieldValueStore::from_json(Arc::new(definition), languages.clone(), value);
                let scheduler = RenderScheduler::new(config.render_window(), Arc::clone(redraw));
                FieldController::build(registry, store, services, config, scheduler)
            })
            .collect::<Vec<_>>();

        tracing::debug!(fields = fields.len(), "form built");
        Ok(Self { fields })
    }

    /// Field controllers
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldController] {
        &self.fields
    }

    /// Mutable controller for `binding`
    pub fn field_mut(&mut self, binding: &str) -> Option<&mut FieldController> {
        self.fields.iter_mut().find(|f| f.definition().binding == binding)
    }

    /// Serialised record; attributes without values are omitted
    #[must_use]
    pub fn serialize(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .serialize()
                    .map(|values| (field.definition().binding.clone(), Value::Array(values)))
            })
            .collect()
    }

    /// Bindings of required fields whose primary slot is blank
    #[must_use]
    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.is_missing_required())
            .map(|field| field.definition().binding.as_str())
            .collect()
    }
}
