//! Custom field definition and value models.

use chamado_core::custom_fields::{FieldSpec, FieldType};
use chamado_core::error::CoreError;
use chamado_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Scope key: field attached to a category (checked at ticket creation).
pub const SCOPE_CATEGORY: &str = "category";

/// Scope key: field attached to an area (checked at transfer time).
pub const SCOPE_AREA: &str = "area";

/// A row from the `custom_field_definitions` table.
///
/// `options` is a JSONB string array, only meaningful for `select` fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomFieldDefinition {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub label: String,
    pub field_type: String,
    pub required: bool,
    pub options: Option<serde_json::Value>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CustomFieldDefinition {
    /// Decode the JSONB option list into plain strings.
    pub fn option_list(&self) -> Vec<String> {
        self.options
            .as_ref()
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Convert this row into the validator's [`FieldSpec`] view.
    pub fn to_spec(&self) -> Result<FieldSpec, CoreError> {
        Ok(FieldSpec {
            id: self.id,
            label: self.label.clone(),
            field_type: FieldType::parse(&self.field_type)?,
            required: self.required,
            options: self.option_list(),
        })
    }
}

/// DTO for creating a field definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomFieldDefinition {
    pub entity_type: String,
    pub entity_id: DbId,
    pub label: String,
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    pub options: Option<Vec<String>>,
    pub description: Option<String>,
}

/// DTO for updating a field definition. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCustomFieldDefinition {
    pub label: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// A row from the `custom_field_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomFieldValue {
    pub id: DbId,
    pub ticket_id: DbId,
    pub field_id: DbId,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
