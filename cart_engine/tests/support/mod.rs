#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use cart_common::Cents;
use cart_engine::{
    db_types::{NewProduct, Product, ProductId},
    events::{CartBroadcaster, EventHandlers, EventHooks},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{Catalog, GatewayCheckoutRequest, GatewayError, GatewaySession, PaymentGateway},
    CartApi,
    CheckoutApi,
    CheckoutUrls,
    SessionCartStore,
    SettlementApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub const PUBLIC_URL: &str = "http://shop.test";

#[derive(Debug, Clone, Default)]
pub enum GatewayMode {
    #[default]
    Accept,
    Reject(String),
    Unconfigured,
}

/// A payment processor that records what it was asked and answers according to its mode.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    pub mode: GatewayMode,
    pub requests: Arc<Mutex<Vec<GatewayCheckoutRequest>>>,
    counter: Arc<AtomicUsize>,
}

impl FakeGateway {
    pub fn rejecting(message: &str) -> Self {
        Self { mode: GatewayMode::Reject(message.to_string()), ..Default::default() }
    }

    pub fn unconfigured() -> Self {
        Self { mode: GatewayMode::Unconfigured, ..Default::default() }
    }

    pub fn requests(&self) -> Vec<GatewayCheckoutRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PaymentGateway for FakeGateway {
    fn is_configured(&self) -> bool {
        !matches!(self.mode, GatewayMode::Unconfigured)
    }

    async fn create_checkout_session(&self, request: GatewayCheckoutRequest) -> Result<GatewaySession, GatewayError> {
        let token = request.order_token.clone();
        self.requests.lock().unwrap().push(request);
        match &self.mode {
            GatewayMode::Accept => {
                let n = self.counter.fetch_add(1, Ordering::SeqCst);
                Ok(GatewaySession {
                    redirect_url: format!("https://pay.example.test/c/{token}"),
                    session_handle: format!("cs_test_{n}"),
                })
            },
            GatewayMode::Reject(msg) => Err(GatewayError::Rejected(msg.clone())),
            GatewayMode::Unconfigured => Err(GatewayError::NotConfigured),
        }
    }
}

pub struct TestShop {
    pub db: SqliteDatabase,
    pub sessions: SessionCartStore,
    pub broadcaster: CartBroadcaster,
    pub gateway: FakeGateway,
    pub cart: CartApi<SqliteDatabase>,
    pub checkout: CheckoutApi<SqliteDatabase, FakeGateway>,
    pub settlement: SettlementApi<SqliteDatabase>,
}

impl TestShop {
    pub async fn new(gateway: FakeGateway) -> Self {
        Self::with_hooks(gateway, EventHooks::default()).await
    }

    pub async fn with_hooks(gateway: FakeGateway, hooks: EventHooks) -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        let sessions = SessionCartStore::new();
        let broadcaster = CartBroadcaster::new(8);
        let handlers = EventHandlers::new(8, hooks);
        let producers = handlers.producers();
        handlers.start_handlers();
        let notifier = Arc::new(broadcaster.clone());
        let cart = CartApi::new(db.clone(), sessions.clone(), notifier.clone());
        let checkout = CheckoutApi::new(
            db.clone(),
            gateway.clone(),
            sessions.clone(),
            notifier,
            producers.clone(),
            CheckoutUrls::new(PUBLIC_URL),
        );
        let settlement = SettlementApi::new(db.clone(), producers);
        Self { db, sessions, broadcaster, gateway, cart, checkout, settlement }
    }

    pub async fn add_product(&self, name: &str, price: i64, stock: i64) -> Product {
        self.db.insert_product(NewProduct::new(name, Cents::from(price), stock)).await.expect("Error adding product")
    }

    pub async fn stock_of(&self, id: ProductId) -> i64 {
        self.db.current_stock(id).await.expect("Error fetching stock").expect("Product is gone")
    }

    pub async fn count_orders(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.db.pool())
            .await
            .expect("Error counting orders")
    }

    pub async fn count_order_lines(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
            .fetch_one(self.db.pool())
            .await
            .expect("Error counting order lines")
    }

    pub async fn tear_down(self) {
        let url = self.db.url().to_string();
        self.db.pool().close().await;
        let _ = Sqlite::drop_database(&url).await;
    }
}
