//! Repository for the `sla_policies` table.

use chamado_core::types::DbId;
use sqlx::PgPool;

use crate::models::sla_policy::{CreateSlaPolicy, SlaPolicy};

const COLUMNS: &str = "id, name, entity_type, entity_id, hours_baixo, hours_medio, \
    hours_alto, priority, created_at, updated_at";

pub struct SlaPolicyRepo;

impl SlaPolicyRepo {
    /// The highest-priority policy attached to one entity, if any.
    pub async fn find_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Option<SlaPolicy>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sla_policies
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY priority DESC, id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, SlaPolicy>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_optional(pool)
            .await
    }

    /// List all policies, highest priority first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<SlaPolicy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sla_policies ORDER BY priority DESC, id ASC");
        sqlx::query_as::<_, SlaPolicy>(&query).fetch_all(pool).await
    }

    /// Insert a new policy, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSlaPolicy) -> Result<SlaPolicy, sqlx::Error> {
        let query = format!(
            "INSERT INTO sla_policies
                (name, entity_type, entity_id, hours_baixo, hours_medio, hours_alto, priority)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SlaPolicy>(&query)
            .bind(&input.name)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(input.hours_baixo)
            .bind(input.hours_medio)
            .bind(input.hours_alto)
            .bind(input.priority)
            .fetch_one(pool)
            .await
    }
}
