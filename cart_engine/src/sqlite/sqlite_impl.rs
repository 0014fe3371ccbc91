//! `SqliteDatabase` is the SQLite implementation of the cart engine backend traits, [`Catalog`] and
//! [`OrderManagement`].
use std::{collections::HashSet, fmt::Debug};

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{new_pool, orders, products};
use crate::{
    db_types::{
        NewOrderLine,
        NewProduct,
        Order,
        OrderDetail,
        OrderLine,
        OrderToken,
        Product,
        ProductId,
        SettlementOutcome,
    },
    helpers::new_order_token,
    traits::{Catalog, CatalogError, OrderManagement, OrderManagementError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl Catalog for SqliteDatabase {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(ids, &mut conn).await?;
        Ok(products)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_order(&self, lines: &[NewOrderLine]) -> Result<OrderDetail, OrderManagementError> {
        validate_lines(lines)?;
        let token = new_order_token();
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(&token, &mut tx).await?;
        let mut saved = Vec::with_capacity(lines.len());
        for line in lines {
            saved.push(orders::insert_order_line(order.id, line, &mut tx).await?);
        }
        tx.commit().await?;
        debug!("🗃️ Order #{} [{}] saved with {} line(s)", order.id, order.token, saved.len());
        Ok(OrderDetail { order, lines: saved })
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let deleted = orders::delete_unpaid_order(order_id, &mut tx).await?;
        if deleted == 0 {
            let existing = orders::fetch_order_by_id(order_id, &mut tx).await?;
            tx.rollback().await?;
            return match existing {
                Some(order) if order.paid => Err(OrderManagementError::OrderIsPaid(order_id)),
                _ => Ok(false),
            };
        }
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} deleted");
        Ok(true)
    }

    async fn fetch_order_by_token(&self, token: &OrderToken) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_token(token, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let lines = orders::fetch_order_lines(order_id, &mut conn).await?;
        Ok(lines)
    }

    /// In a single transaction:
    /// * flips `paid` from false to true for the order with this token. If nothing was flipped, the order is either
    ///   already paid or unknown, and no stock is touched.
    /// * decrements the stock of every product on the order by the line quantity, floored at zero.
    async fn settle_order(&self, token: &OrderToken) -> Result<SettlementOutcome, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let outcome = match orders::mark_paid_if_unpaid(token, &mut tx).await? {
            Some(order) => {
                let lines = orders::fetch_order_lines(order.id, &mut tx).await?;
                for line in &lines {
                    products::decrement_stock(line.product_id, line.quantity, &mut tx).await?;
                }
                debug!("🗃️ Order #{} marked paid. Stock decremented for {} line(s).", order.id, lines.len());
                SettlementOutcome::Settled(OrderDetail { order, lines })
            },
            None => match orders::fetch_order_by_token(token, &mut tx).await? {
                Some(order) => SettlementOutcome::AlreadyPaid(order),
                None => SettlementOutcome::NotFound,
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }
}

fn validate_lines(lines: &[NewOrderLine]) -> Result<(), OrderManagementError> {
    if lines.is_empty() {
        return Err(OrderManagementError::EmptyOrder);
    }
    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(OrderManagementError::InvalidQuantity(line.quantity));
        }
        if !seen.insert(line.product_id) {
            return Err(OrderManagementError::DuplicateLine(line.product_id.value()));
        }
    }
    Ok(())
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Adds a product to the catalog. Catalog maintenance belongs to the hosting application; this exists for seeding
    /// and tests.
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    pub async fn set_stock(&self, id: ProductId, stock_quantity: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::set_stock(id, stock_quantity, &mut conn).await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<bool, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = products::delete_product(id, &mut conn).await?;
        Ok(deleted)
    }
}
