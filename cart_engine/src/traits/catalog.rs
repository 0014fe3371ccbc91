use cart_common::Cents;
use thiserror::Error;

use crate::db_types::{Product, ProductId};

/// Read access to the product catalog. Products are managed elsewhere; the cart only ever reads them.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Fetches a single product. Returns `None` if there is no product with this id.
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;

    /// Fetches every product in `ids` that still exists. Missing ids are silently skipped.
    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;

    /// The live stock level of a product, or `None` if it does not exist.
    async fn current_stock(&self, id: ProductId) -> Result<Option<i64>, CatalogError> {
        Ok(self.find_product(id).await?.map(|p| p.stock_quantity))
    }

    /// The live unit price of a product, or `None` if it does not exist.
    async fn current_price(&self, id: ProductId) -> Result<Option<Cents>, CatalogError> {
        Ok(self.find_product(id).await?.map(|p| p.price))
    }
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
