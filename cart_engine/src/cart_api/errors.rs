use thiserror::Error;

use crate::{
    db_types::ProductId,
    traits::{CatalogError, GatewayError, OrderManagementError},
};

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("No valid products in cart.")]
    NoValidLines,
    #[error("The payment gateway is not configured.")]
    GatewayNotConfigured,
    #[error("Could not create a checkout session: {0}")]
    Gateway(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<OrderManagementError> for CheckoutError {
    fn from(e: OrderManagementError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NotConfigured => Self::GatewayNotConfigured,
            GatewayError::Rejected(msg) => Self::Gateway(msg),
            GatewayError::Unavailable(msg) => Self::Gateway(msg),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderManagementError> for SettlementError {
    fn from(e: OrderManagementError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
