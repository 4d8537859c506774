//! Products repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    error::AppResult,
    models::{product::Product, remote::RemoteProduct},
};

#[derive(Clone)]
pub struct ProductsRepository {
    pool: Pool<Sqlite>,
}

impl ProductsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Replace the whole catalog from a reference pull. Delete-and-reinsert
    /// is fine here: the table is never locally mutated between pulls.
    pub async fn replace_all(&self, products: &[RemoteProduct]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;

        for p in products {
            sqlx::query(
                r#"
                INSERT INTO products (id, name, category, unit, current_quantity, price, barcode)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(p.id)
            .bind(&p.name)
            .bind(&p.category)
            .bind(&p.unit)
            .bind(p.current_quantity)
            .bind(p.price)
            .bind(&p.barcode)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
