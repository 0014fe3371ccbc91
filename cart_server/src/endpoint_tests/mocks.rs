use cart_engine::{
    db_types::{
        NewOrderLine,
        Order,
        OrderDetail,
        OrderLine,
        OrderToken,
        Product,
        ProductId,
        SettlementOutcome,
    },
    traits::{
        Catalog,
        CatalogError,
        GatewayCheckoutRequest,
        GatewayError,
        GatewaySession,
        OrderManagement,
        OrderManagementError,
        PaymentGateway,
    },
};
use mockall::mock;

mock! {
    pub Backend {}
    impl Catalog for Backend {
        async fn find_product(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;
        async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;
    }
    impl OrderManagement for Backend {
        async fn create_order(&self, lines: &[NewOrderLine]) -> Result<OrderDetail, OrderManagementError>;
        async fn delete_order(&self, order_id: i64) -> Result<bool, OrderManagementError>;
        async fn fetch_order_by_token(&self, token: &OrderToken) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, OrderManagementError>;
        async fn settle_order(&self, token: &OrderToken) -> Result<SettlementOutcome, OrderManagementError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        fn is_configured(&self) -> bool;
        async fn create_checkout_session(
            &self,
            request: GatewayCheckoutRequest,
        ) -> Result<GatewaySession, GatewayError>;
    }
}
