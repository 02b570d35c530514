//! Repository for custom field definitions and per-ticket values.

use chamado_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::custom_field::{
    CreateCustomFieldDefinition, CustomFieldDefinition, CustomFieldValue,
    UpdateCustomFieldDefinition,
};

const DEFINITION_COLUMNS: &str = "id, entity_type, entity_id, label, field_type, required, \
    options, description, active, created_at, updated_at";

const VALUE_COLUMNS: &str = "id, ticket_id, field_id, value, created_at, updated_at";

pub struct CustomFieldRepo;

impl CustomFieldRepo {
    /// List field definitions for one scope (category or area).
    pub async fn list_for_scope(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
        only_active: bool,
    ) -> Result<Vec<CustomFieldDefinition>, sqlx::Error> {
        let query = format!(
            "SELECT {DEFINITION_COLUMNS} FROM custom_field_definitions
             WHERE entity_type = $1 AND entity_id = $2
               AND ($3 = FALSE OR active = TRUE)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, CustomFieldDefinition>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .bind(only_active)
            .fetch_all(pool)
            .await
    }

    /// Find a definition by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CustomFieldDefinition>, sqlx::Error> {
        let query =
            format!("SELECT {DEFINITION_COLUMNS} FROM custom_field_definitions WHERE id = $1");
        sqlx::query_as::<_, CustomFieldDefinition>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new field definition.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCustomFieldDefinition,
    ) -> Result<CustomFieldDefinition, sqlx::Error> {
        let options = input
            .options
            .as_ref()
            .map(|opts| serde_json::to_value(opts).unwrap_or(serde_json::Value::Null));
        let query = format!(
            "INSERT INTO custom_field_definitions
                (entity_type, entity_id, label, field_type, required, options, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {DEFINITION_COLUMNS}"
        );
        sqlx::query_as::<_, CustomFieldDefinition>(&query)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.label)
            .bind(&input.field_type)
            .bind(input.required)
            .bind(options)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Update a definition; absent DTO fields keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCustomFieldDefinition,
    ) -> Result<Option<CustomFieldDefinition>, sqlx::Error> {
        let options = input
            .options
            .as_ref()
            .map(|opts| serde_json::to_value(opts).unwrap_or(serde_json::Value::Null));
        let query = format!(
            "UPDATE custom_field_definitions
             SET label = COALESCE($2, label),
                 required = COALESCE($3, required),
                 options = COALESCE($4, options),
                 description = COALESCE($5, description),
                 active = COALESCE($6, active),
                 updated_at = now()
             WHERE id = $1
             RETURNING {DEFINITION_COLUMNS}"
        );
        sqlx::query_as::<_, CustomFieldDefinition>(&query)
            .bind(id)
            .bind(&input.label)
            .bind(input.required)
            .bind(options)
            .bind(&input.description)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Deactivate a definition. Values already captured against tickets are
    /// kept; the field simply stops being required or listed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE custom_field_definitions SET active = FALSE, updated_at = now()
             WHERE id = $1 AND active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Upsert submitted values for a ticket, one row per field.
    pub async fn upsert_values(
        conn: &mut PgConnection,
        ticket_id: DbId,
        values: &[(DbId, String)],
    ) -> Result<(), sqlx::Error> {
        for (field_id, value) in values {
            sqlx::query(
                "INSERT INTO custom_field_values (ticket_id, field_id, value)
                 VALUES ($1, $2, $3)
                 ON CONFLICT ON CONSTRAINT uq_custom_field_values_ticket_field
                 DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
            )
            .bind(ticket_id)
            .bind(field_id)
            .bind(value)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// List the values captured for a ticket.
    pub async fn list_values_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<CustomFieldValue>, sqlx::Error> {
        let query = format!(
            "SELECT {VALUE_COLUMNS} FROM custom_field_values
             WHERE ticket_id = $1 ORDER BY field_id ASC"
        );
        sqlx::query_as::<_, CustomFieldValue>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
