use log::*;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{NewProduct, Product, ProductId};

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

/// Fetches every product in `ids` that exists, ordered by id.
pub async fn fetch_products(ids: &[ProductId], conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE id IN (");
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(") ORDER BY id");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, stock_quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock_quantity)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} '{}' added to the catalog", product.id, product.name);
    Ok(product)
}

/// Overwrites the stock level of a product. Returns `None` if the product does not exist.
pub async fn set_stock(
    id: ProductId,
    stock_quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        "UPDATE products SET stock_quantity = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(stock_quantity.max(0))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

/// Takes `quantity` units out of stock. The stock level is floored at zero in the same statement, so a concurrent
/// sale can push it to zero but never below.
pub async fn decrement_stock(id: ProductId, quantity: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET stock_quantity = MAX(stock_quantity - $1, 0), updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(quantity)
    .bind(id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        warn!("🗃️ Product #{id} no longer exists, so its stock could not be decremented by {quantity}");
    } else {
        trace!("🗃️ Stock for product #{id} decremented by {quantity}");
    }
    Ok(())
}

pub async fn delete_product(id: ProductId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
