//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
//!
//! Every handler that touches a cart takes a [`SessionContext`], which the session middleware guarantees is present.
use std::{convert::Infallible, time::Duration};

use actix_web::{
    get,
    http::header,
    web::{self, Bytes},
    HttpRequest,
    HttpResponse,
    Responder,
};
use cart_engine::{
    db_types::OrderToken,
    events::CartBroadcaster,
    traits::{CartBackend, Catalog, OrderManagement, PaymentGateway},
    CartApi,
    CheckoutApi,
    CheckoutError,
    SessionCartStore,
    SettlementApi,
};
use log::*;
use tokio::time::{interval_at, Instant};
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use crate::{
    data_objects::{
        AddCartItemRequest,
        CartSummary,
        CheckoutNavigation,
        PaymentReturnParams,
        RemoveCartItemParams,
        SettlementPage,
    },
    errors::ServerError,
    event_stream::CartEventStream,
    helpers::{redirect_with_alert, see_other, wants_json},
    middleware::SessionContext,
};

/// How often an idle cart stream sends a comment line, so that proxies do not close it.
pub const STREAM_KEEP_ALIVE: Duration = Duration::from_secs(15);

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(cart => Get "/cart" impl Catalog);
/// The session's cart, priced from the live catalog.
///
/// The response includes the `topic_id` that `/cart/stream` publishes changes under.
pub async fn cart<B: Catalog>(
    session: SessionContext,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET cart for session");
    let cart = api.cart_view(&session.session_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_cart_item => Post "/cart_items" impl Catalog);
/// Adds a product to the session's cart.
///
/// Quantities are clamped, never rejected: the response's `line_qty` says how many are actually in the cart. Unknown
/// products are a 404.
pub async fn add_cart_item<B: Catalog>(
    session: SessionContext,
    body: web::Json<AddCartItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let AddCartItemRequest { product_id, quantity } = body.into_inner();
    debug!("💻️ Add to cart request for product {product_id}, quantity {quantity:?}");
    let result = api.add_to_cart(&session.session_id, product_id, quantity).await?;
    Ok(HttpResponse::Ok().json(CartSummary::from(result)))
}

route!(remove_cart_item => Delete "/cart_items" impl Catalog);
/// Removes a product's line. Without a `product_id` nothing is removed and the current cart is returned.
pub async fn remove_cart_item<B: Catalog>(
    session: SessionContext,
    params: web::Query<RemoveCartItemParams>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let Some(product_id) = params.product_id else {
        debug!("💻️ Remove from cart request without a product. Nothing to remove.");
        let cart = api.cart_view(&session.session_id).await?;
        return Ok(HttpResponse::Ok().json(CartSummary::unchanged(cart)));
    };
    debug!("💻️ Remove from cart request for product {product_id}");
    let result = api.remove_from_cart(&session.session_id, product_id).await?;
    Ok(HttpResponse::Ok().json(CartSummary::from(result)))
}

route!(cart_stream => Get "/cart/stream" impl Catalog);
/// Server-sent events for the session's cart.
///
/// Every change to the cart, from any tab of the session, is sent as an `event: cart` frame whose data is the JSON
/// encoded [`CartChanged`](cart_engine::events::CartChanged). An idle stream sends a comment line every
/// [`STREAM_KEEP_ALIVE`]. The subscription ends, and the topic is released, when the client disconnects.
pub async fn cart_stream<B: Catalog>(
    session: SessionContext,
    api: web::Data<CartApi<B>>,
    broadcaster: web::Data<CartBroadcaster>,
) -> HttpResponse {
    let topic = api.topic_for(&session.session_id);
    debug!("💻️ New cart stream subscriber on {topic}");
    let events = CartEventStream::subscribe(broadcaster, topic);
    let keep_alive = IntervalStream::new(interval_at(Instant::now() + STREAM_KEEP_ALIVE, STREAM_KEEP_ALIVE))
        .map(|_| Bytes::from_static(b": keep-alive\n\n"));
    let stream = events.merge(keep_alive).map(Ok::<_, Infallible>);
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl CartBackend, PaymentGateway);
/// Converts the session's cart into an order and sends the shopper to the payment page.
///
/// Browsers get a `303 See Other`, either to the payment page or back to `/cart` with an `alert` explaining why
/// checkout did not go ahead. Clients that send `Accept: application/json` get `{"navigate_to": ..}` instead, and
/// failures come back as JSON errors.
pub async fn checkout<B, G>(
    req: HttpRequest,
    session: SessionContext,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CartBackend,
    G: PaymentGateway,
{
    let json = wants_json(&req);
    debug!("💻️ Checkout request (json: {json})");
    match api.begin_checkout(&session.session_id).await {
        Ok(redirect) if json => Ok(HttpResponse::Ok()
            .json(CheckoutNavigation { navigate_to: redirect.redirect_url, order_token: redirect.order_token })),
        Ok(redirect) => Ok(see_other(&redirect.redirect_url)),
        Err(e) if json => Err(e.into()),
        Err(CheckoutError::DatabaseError(e)) => {
            error!("💻️ Checkout failed with a backend error. {e}");
            Ok(redirect_with_alert("Something went wrong on our side. Please try again."))
        },
        Err(e) => {
            info!("💻️ Checkout did not go ahead. {e}");
            Ok(redirect_with_alert(&e.to_string()))
        },
    }
}

route!(checkout_success => Get "/checkout/success" impl OrderManagement);
/// The page the payment processor returns the shopper to. Confirms payment for the order in `cart_token`.
///
/// This page always answers 200: a replayed, tampered or unknown token is reported on the page, not as an error.
pub async fn checkout_success<B: OrderManagement>(
    params: web::Query<PaymentReturnParams>,
    api: web::Data<SettlementApi<B>>,
) -> HttpResponse {
    let PaymentReturnParams { cart_token, session_id } = params.into_inner();
    let token = match cart_token.filter(|t| !t.trim().is_empty()) {
        Some(t) => OrderToken::from(t.trim()),
        None => {
            debug!("💻️ Payment return without an order token");
            return HttpResponse::Ok().json(SettlementPage::not_found(None));
        },
    };
    debug!("💻️ Payment return for order [{token}] (processor session {})", session_id.as_deref().unwrap_or("n/a"));
    let page = match api.confirm_payment(&token).await {
        Ok(outcome) => SettlementPage::from_outcome(token, &outcome),
        Err(e) => {
            error!("💻️ Could not settle order [{token}]. {e}");
            SettlementPage::unavailable(token)
        },
    };
    HttpResponse::Ok().json(page)
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_order => Get "/orders/mine" impl OrderManagement);
/// The last order this session checked out, with its lines.
pub async fn my_order<B: OrderManagement>(
    session: SessionContext,
    sessions: web::Data<SessionCartStore>,
    api: web::Data<SettlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let token = sessions
        .order_token(&session.session_id)
        .await
        .ok_or_else(|| ServerError::NoRecordFound("This session has not placed an order.".into()))?;
    trace!("💻️ Fetching order [{token}] for session");
    let order = api
        .order_for_token(&token)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {token} no longer exists.")))?;
    Ok(HttpResponse::Ok().json(order))
}
