//! Read-only repositories for clients, products, and categories.

use chamado_core::types::DbId;
use sqlx::PgPool;

use crate::models::lookup::{Category, Client, Product};

pub struct ClientRepo;

impl ClientRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>(
            "SELECT id, name, vip, created_at, updated_at FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

pub struct ProductRepo;

impl ProductRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, client_id, created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
