use std::sync::Arc;

use actix_web::{http::StatusCode, test::TestRequest, web};
use cart_engine::{
    db_types::{OrderDetail, ProductId},
    events::{EventProducers, NullNotifier},
    traits::{GatewayError, GatewaySession},
    CheckoutApi,
    CheckoutUrls,
    SessionCartStore,
};

use super::{
    helpers::{order, order_line, product, send_request, session_id, with_session},
    mocks::{MockBackend, MockGateway},
};
use crate::routes::CheckoutRoute;

const PAYMENT_PAGE: &str = "https://checkout.test/pay/cs_test_1";

fn configure_checkout(
    backend: MockBackend,
    gateway: MockGateway,
    sessions: SessionCartStore,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let urls = CheckoutUrls::new("http://shop.test");
        let api =
            CheckoutApi::new(backend, gateway, sessions, Arc::new(NullNotifier), EventProducers::default(), urls);
        cfg.app_data(web::Data::new(api)).service(CheckoutRoute::<MockBackend, MockGateway>::new());
    }
}

async fn cart_with_two_mugs() -> SessionCartStore {
    let sessions = SessionCartStore::new();
    sessions.add_line(&session_id(), &product(1, "Mug", 1250, 10), 2).await;
    sessions
}

fn backend_for_new_order() -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_find_products().returning(|_| Ok(vec![product(1, "Mug", 1250, 10)]));
    backend.expect_create_order().times(1).returning(|lines| {
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, ProductId(1));
        assert_eq!(lines[0].quantity, 2);
        Ok(OrderDetail { order: order(7, "a1b2c3d4e5f6a7b8c9d0", false), lines: vec![order_line(1, 7, 1, 2)] })
    });
    backend
}

fn accepting_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    gateway.expect_create_checkout_session().times(1).returning(|req| {
        assert_eq!(
            req.success_url,
            "http://shop.test/checkout/success?cart_token=a1b2c3d4e5f6a7b8c9d0&session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(req.cancel_url, "http://shop.test/cart");
        assert_eq!(req.line_items[0].total().value(), 2500);
        Ok(GatewaySession { redirect_url: PAYMENT_PAGE.into(), session_handle: "cs_test_1".into() })
    });
    gateway
}

#[actix_web::test]
async fn empty_cart_redirects_back_with_an_alert() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::post().uri("/checkout"));
    let configure = configure_checkout(MockBackend::new(), MockGateway::new(), SessionCartStore::new());
    let res = send_request(req, configure).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some("/cart?alert=Your%20cart%20is%20empty."));
}

#[actix_web::test]
async fn empty_cart_is_a_422_for_json_clients() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::post().uri("/checkout").insert_header(("Accept", "application/json")));
    let configure = configure_checkout(MockBackend::new(), MockGateway::new(), SessionCartStore::new());
    let res = send_request(req, configure).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body, r#"{"error":"Your cart is empty."}"#);
}

#[actix_web::test]
async fn sold_out_cart_is_refused() {
    let _ = env_logger::try_init().ok();
    let sessions = cart_with_two_mugs().await;
    let mut backend = MockBackend::new();
    backend.expect_find_products().returning(|_| Ok(vec![product(1, "Mug", 1250, 0)]));
    backend.expect_create_order().never();
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    let req = with_session(TestRequest::post().uri("/checkout"));
    let res = send_request(req, configure_checkout(backend, gateway, sessions.clone())).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some("/cart?alert=No%20valid%20products%20in%20cart."));
    assert_eq!(sessions.total_quantity(&session_id()).await, 2);
}

#[actix_web::test]
async fn successful_checkout_redirects_to_the_payment_page() {
    let _ = env_logger::try_init().ok();
    let sessions = cart_with_two_mugs().await;
    let req = with_session(TestRequest::post().uri("/checkout"));
    let configure = configure_checkout(backend_for_new_order(), accepting_gateway(), sessions.clone());
    let res = send_request(req, configure).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), Some(PAYMENT_PAGE));
    assert_eq!(sessions.total_quantity(&session_id()).await, 0);
    assert_eq!(sessions.order_token(&session_id()).await.unwrap().as_str(), "a1b2c3d4e5f6a7b8c9d0");
}

#[actix_web::test]
async fn json_clients_are_told_where_to_navigate() {
    let _ = env_logger::try_init().ok();
    let sessions = cart_with_two_mugs().await;
    let req = with_session(TestRequest::post().uri("/checkout").insert_header(("Accept", "application/json")));
    let configure = configure_checkout(backend_for_new_order(), accepting_gateway(), sessions.clone());
    let res = send_request(req, configure).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["navigate_to"], PAYMENT_PAGE);
    assert_eq!(body["order_token"], "a1b2c3d4e5f6a7b8c9d0");
}

#[actix_web::test]
async fn gateway_rejection_rolls_back_and_shows_the_message() {
    let _ = env_logger::try_init().ok();
    let sessions = cart_with_two_mugs().await;
    let mut backend = backend_for_new_order();
    backend.expect_delete_order().withf(|id| *id == 7).times(1).returning(|_| Ok(true));
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    gateway
        .expect_create_checkout_session()
        .times(1)
        .returning(|_| Err(GatewayError::Rejected("Amount must be at least 50 cents".into())));
    let req = with_session(TestRequest::post().uri("/checkout"));
    let res = send_request(req, configure_checkout(backend, gateway, sessions.clone())).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    let expected = "/cart?alert=Could%20not%20create%20a%20checkout%20session%3A%20\
                    Amount%20must%20be%20at%20least%2050%20cents";
    assert_eq!(res.header("location"), Some(expected));
    assert_eq!(sessions.total_quantity(&session_id()).await, 2);
    assert!(sessions.order_token(&session_id()).await.is_none());
}

#[actix_web::test]
async fn gateway_rejection_is_a_502_for_json_clients() {
    let _ = env_logger::try_init().ok();
    let sessions = cart_with_two_mugs().await;
    let mut backend = backend_for_new_order();
    backend.expect_delete_order().times(1).returning(|_| Ok(true));
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(true);
    gateway.expect_create_checkout_session().returning(|_| Err(GatewayError::Rejected("Card declined".into())));
    let req = with_session(TestRequest::post().uri("/checkout").insert_header(("Accept", "application/json")));
    let res = send_request(req, configure_checkout(backend, gateway, sessions)).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.body, r#"{"error":"Could not create a checkout session: Card declined"}"#);
}

#[actix_web::test]
async fn unconfigured_gateway_is_a_503() {
    let _ = env_logger::try_init().ok();
    let sessions = cart_with_two_mugs().await;
    let mut backend = MockBackend::new();
    backend.expect_find_products().returning(|_| Ok(vec![product(1, "Mug", 1250, 10)]));
    backend.expect_create_order().never();
    let mut gateway = MockGateway::new();
    gateway.expect_is_configured().return_const(false);
    let req = with_session(TestRequest::post().uri("/checkout").insert_header(("Accept", "application/json")));
    let res = send_request(req, configure_checkout(backend, gateway, sessions.clone())).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(sessions.total_quantity(&session_id()).await, 2);
}
