//! Database operations for the products table.

use replication_engine::{Product, ProductId, ProductRepository, StorageError};
use sqlx::{PgPool, Row};
use std::collections::HashMap;

/// A stored product row from the database.
#[derive(Debug)]
pub struct StoredProduct {
    pub id: i64,
    pub name: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredProduct {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredProduct {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl StoredProduct {
    /// Convert database row to an engine Product.
    pub fn to_product(&self) -> Product {
        Product::new(self.id, self.name.clone())
    }
}

/// PostgreSQL implementation of the engine's product repository.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for PgProductRepository {
    async fn find_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, StorageError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, StoredProduct>(
            r#"
            SELECT id, name
            FROM products
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.iter().map(|row| (row.id, row.to_product())).collect())
    }

    /// Save the batch in one transaction so a failure leaves no partial write.
    async fn save(&self, products: &[Product]) -> Result<(), StorageError> {
        let batch = SaveBatch::split(products);
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        if !batch.update_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO products (id, name)
                SELECT * FROM UNNEST($1::bigint[], $2::text[])
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    updated_at = NOW()
                "#,
            )
            .bind(&batch.update_ids)
            .bind(&batch.update_names)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        if !batch.insert_names.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO products (name)
                SELECT * FROM UNNEST($1::text[])
                "#,
            )
            .bind(&batch.insert_names)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;

        tracing::debug!(
            updated = batch.update_ids.len(),
            inserted = batch.insert_names.len(),
            "Saved product batch"
        );
        Ok(())
    }
}

/// Column arrays for the two bulk statements of a save.
#[derive(Debug, Default, PartialEq)]
struct SaveBatch {
    update_ids: Vec<i64>,
    update_names: Vec<String>,
    insert_names: Vec<String>,
}

impl SaveBatch {
    /// Split a batch into upserts and inserts.
    ///
    /// One upsert statement may not touch a row twice, so repeated IDs
    /// collapse to their last occurrence in the batch.
    fn split(products: &[Product]) -> Self {
        let mut batch = SaveBatch::default();
        let mut positions: HashMap<ProductId, usize> = HashMap::new();

        for product in products {
            match product.id {
                Some(id) => match positions.get(&id) {
                    Some(&pos) => batch.update_names[pos].clone_from(&product.name),
                    None => {
                        positions.insert(id, batch.update_ids.len());
                        batch.update_ids.push(id);
                        batch.update_names.push(product.name.clone());
                    }
                },
                None => batch.insert_names.push(product.name.clone()),
            }
        }

        batch
    }
}

/// Classify a sqlx error for the engine.
fn storage_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::Unavailable(e.to_string())
        }
        other => StorageError::Database(other.to_string()),
    }
}
