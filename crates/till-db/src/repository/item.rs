//! # Item Repository
//!
//! Catalog (menu) items and their categories.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_timestamp, encode_timestamp};
use till_core::{CatalogItem, Money};

#[derive(Debug, FromRow)]
struct ItemRow {
    id: String,
    name: String,
    price_cents: i64,
    image: Option<String>,
    category: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ItemRow> for CatalogItem {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        let created_at = decode_timestamp("Item", &row.id, &row.created_at)?;
        let updated_at = decode_timestamp("Item", &row.id, &row.updated_at)?;
        Ok(CatalogItem {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            image: row.image,
            category: row.category,
            created_at,
            updated_at,
        })
    }
}

/// Repository for catalog items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists items by name, optionally restricted to one category.
    pub async fn list(&self, category: Option<&str>) -> DbResult<Vec<CatalogItem>> {
        let rows: Vec<ItemRow> = match category {
            Some(category) => {
                sqlx::query_as(
                    "SELECT id, name, price_cents, image, category, created_at, updated_at \
                     FROM items WHERE category = ?1 ORDER BY name, id",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, name, price_cents, image, category, created_at, updated_at \
                     FROM items ORDER BY name, id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(CatalogItem::try_from).collect()
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let row: Option<ItemRow> = sqlx::query_as(
            "SELECT id, name, price_cents, image, category, created_at, updated_at \
             FROM items WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CatalogItem::try_from).transpose()
    }

    pub async fn insert(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(item_id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (id, name, price_cents, image, category, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(&item.image)
        .bind(&item.category)
        .bind(encode_timestamp(item.created_at))
        .bind(encode_timestamp(item.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrites name, price, image and category.
    ///
    /// ## Errors
    /// `NotFound` if no item has `item.id`.
    pub async fn update(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(item_id = %item.id, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?2, price_cents = ?3, image = ?4, category = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(&item.image)
        .bind(&item.category)
        .bind(encode_timestamp(item.updated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", &item.id));
        }
        Ok(())
    }

    /// Deletes an item. Returns false if no item had that id.
    ///
    /// Bills keep their own snapshot, so deleting an item never touches
    /// billing history.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Distinct categories in alphabetical order.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM items ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
