//! Repository for the `areas` table.

use chamado_core::types::DbId;
use sqlx::PgPool;

use crate::models::area::Area;

const COLUMNS: &str = "id, name, active, created_at, updated_at";

pub struct AreaRepo;

impl AreaRepo {
    /// Find an area by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Area>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM areas WHERE id = $1");
        sqlx::query_as::<_, Area>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active areas, ordered by name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Area>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM areas WHERE active = TRUE ORDER BY name ASC");
        sqlx::query_as::<_, Area>(&query).fetch_all(pool).await
    }
}
