use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use cart_engine::{
    events::{CartBroadcaster, CartNotifier, EventHandlers, EventHooks, EventProducers},
    CartApi,
    CheckoutApi,
    CheckoutUrls,
    SessionCartStore,
    SettlementApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::StripeGateway,
    session_expiry_worker::start_session_expiry_worker,
    middleware::SessionMiddlewareFactory,
    routes::{
        health,
        AddCartItemRoute,
        CartRoute,
        CartStreamRoute,
        CheckoutRoute,
        CheckoutSuccessRoute,
        MyOrderRoute,
        RemoveCartItemRoute,
    },
};

const HOOK_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway =
        StripeGateway::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(HOOK_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    // Shared by every worker. Carts and cart streams must be visible across all of them.
    let sessions = SessionCartStore::new();
    let _expiry_worker = start_session_expiry_worker(sessions.clone(), config.session_idle_timeout);
    let srv = create_server_instance(config, db, gateway, sessions, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Hooks that record order lifecycle events in the log.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            Box::pin(async move {
                info!(
                    "🪝️ Order #{} [{}] created with {} line(s). Payment session {}",
                    ev.order.id,
                    ev.order.token,
                    ev.lines.len(),
                    ev.gateway_session_id
                );
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        })
        .on_order_paid(|ev| {
            Box::pin(async move {
                let units = ev.lines.iter().map(|l| l.quantity).sum::<i64>();
                info!("🪝️ Order #{} [{}] paid. {units} unit(s) taken out of stock.", ev.order.id, ev.order.token);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: StripeGateway,
    sessions: SessionCartStore,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let broadcaster = web::Data::new(CartBroadcaster::new(config.broadcast_buffer));
    let notifier: Arc<dyn CartNotifier> = broadcaster.clone().into_inner();
    let urls = CheckoutUrls::new(&config.public_url);
    let secure_cookies = config.secure_cookies;
    info!("💻️ Payment return URLs will point at {}", config.public_url);
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone(), sessions.clone(), Arc::clone(&notifier));
        let checkout_api = CheckoutApi::new(
            db.clone(),
            gateway.clone(),
            sessions.clone(),
            Arc::clone(&notifier),
            producers.clone(),
            urls.clone(),
        );
        let settlement_api = SettlementApi::new(db.clone(), producers.clone());
        App::new()
            .wrap(SessionMiddlewareFactory::new(secure_cookies))
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cart::access_log"))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(settlement_api))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(broadcaster.clone())
            .app_data(
                web::JsonConfig::default().error_handler(|e, _| ServerError::InvalidRequestBody(e.to_string()).into()),
            )
            .app_data(
                web::QueryConfig::default().error_handler(|e, _| ServerError::InvalidRequestBody(e.to_string()).into()),
            )
            .service(health)
            .service(CartStreamRoute::<SqliteDatabase>::new())
            .service(CartRoute::<SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase, StripeGateway>::new())
            .service(CheckoutSuccessRoute::<SqliteDatabase>::new())
            .service(MyOrderRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
