//! Repository for the `board_columns` table.

use sqlx::PgPool;

use crate::models::board_column::{BoardColumn, CreateBoardColumn};

const COLUMNS: &str = "id, label, color, status_key, position, created_at, updated_at";

pub struct BoardColumnRepo;

impl BoardColumnRepo {
    /// List the custom column set in display order. Empty means the
    /// organization uses the default six-status columns.
    pub async fn list_ordered(pool: &PgPool) -> Result<Vec<BoardColumn>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM board_columns ORDER BY position ASC");
        sqlx::query_as::<_, BoardColumn>(&query).fetch_all(pool).await
    }

    /// Replace the whole custom column set atomically.
    pub async fn replace_all(
        pool: &PgPool,
        columns: &[CreateBoardColumn],
    ) -> Result<Vec<BoardColumn>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM board_columns")
            .execute(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            let query = format!(
                "INSERT INTO board_columns (label, color, status_key, position)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {COLUMNS}"
            );
            let row = sqlx::query_as::<_, BoardColumn>(&query)
                .bind(&column.label)
                .bind(&column.color)
                .bind(&column.status_key)
                .bind(position as i32)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }
}
