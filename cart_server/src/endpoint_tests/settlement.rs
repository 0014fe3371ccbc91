use actix_web::{http::StatusCode, test::TestRequest, web};
use cart_engine::{
    db_types::{OrderDetail, OrderToken, SettlementOutcome},
    events::EventProducers,
    traits::OrderManagementError,
    SessionCartStore,
    SettlementApi,
};

use super::{
    helpers::{order, order_line, send_request, session_id, with_session},
    mocks::MockBackend,
};
use crate::routes::{CheckoutSuccessRoute, MyOrderRoute};

const TOKEN: &str = "0badc0ffee0badc0ffee";

fn configure_settlement(backend: MockBackend, sessions: SessionCartStore) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let api = SettlementApi::new(backend, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(sessions))
            .service(CheckoutSuccessRoute::<MockBackend>::new())
            .service(MyOrderRoute::<MockBackend>::new());
    }
}

fn success_request(token: &str) -> TestRequest {
    TestRequest::get().uri(&format!("/checkout/success?cart_token={token}&session_id=cs_test_1"))
}

#[actix_web::test]
async fn first_return_settles_the_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_settle_order()
        .withf(|token| token.as_str() == TOKEN)
        .times(1)
        .returning(|_| {
            let detail = OrderDetail { order: order(3, TOKEN, true), lines: vec![order_line(1, 3, 1, 2)] };
            Ok(SettlementOutcome::Settled(detail))
        });
    // The lines come back with the settlement. Nothing is read after the commit.
    backend.expect_fetch_order_lines().never();
    let res = send_request(success_request(TOKEN), configure_settlement(backend, SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["status"], "settled");
    assert_eq!(body["paid"], true);
    assert_eq!(body["order_token"], TOKEN);
}

#[actix_web::test]
async fn replayed_return_reports_already_paid() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_settle_order().returning(|_| Ok(SettlementOutcome::AlreadyPaid(order(3, TOKEN, true))));
    backend.expect_fetch_order_lines().never();
    let res = send_request(success_request(TOKEN), configure_settlement(backend, SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "already_paid");
    assert_eq!(res.json()["paid"], true);
}

#[actix_web::test]
async fn unknown_or_missing_tokens_are_not_errors() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend.expect_settle_order().times(1).returning(|_| Ok(SettlementOutcome::NotFound));
    let res = send_request(success_request("nope"), configure_settlement(backend, SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "not_found");
    assert_eq!(res.json()["paid"], false);

    let mut backend = MockBackend::new();
    backend.expect_settle_order().never();
    let req = TestRequest::get().uri("/checkout/success");
    let res = send_request(req, configure_settlement(backend, SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "not_found");
    assert!(res.json()["order_token"].is_null());
}

#[actix_web::test]
async fn backend_failure_still_answers_200() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockBackend::new();
    backend
        .expect_settle_order()
        .returning(|_| Err(OrderManagementError::DatabaseError("database is locked".into())));
    let res = send_request(success_request(TOKEN), configure_settlement(backend, SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "unavailable");
    assert_eq!(res.json()["paid"], false);
}

#[actix_web::test]
async fn my_order_without_a_checkout_is_a_404() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::get().uri("/orders/mine"));
    let res = send_request(req, configure_settlement(MockBackend::new(), SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, r#"{"error":"The data was not found. This session has not placed an order."}"#);
}

#[actix_web::test]
async fn my_order_shows_the_remembered_order() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    sessions.remember_order_token(&session_id(), OrderToken::from(TOKEN)).await;
    let mut backend = MockBackend::new();
    backend
        .expect_fetch_order_by_token()
        .withf(|token| token.as_str() == TOKEN)
        .returning(|_| Ok(Some(order(3, TOKEN, false))));
    backend.expect_fetch_order_lines().returning(|id| Ok(vec![order_line(1, id, 1, 2), order_line(2, id, 4, 1)]));
    let req = with_session(TestRequest::get().uri("/orders/mine"));
    let res = send_request(req, configure_settlement(backend, sessions)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["order"]["token"], TOKEN);
    assert_eq!(body["order"]["paid"], false);
    assert_eq!(body["lines"].as_array().map(|l| l.len()), Some(2));
}
