use std::{future::poll_fn, sync::Arc, time::Duration};

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use cart_engine::{
    db_types::ProductId,
    events::{CartBroadcaster, CartChangeReason, CartChanged, CartLineView, CartNotifier, NullNotifier},
    CartApi,
    SessionCartStore,
};
use serde_json::json;

use super::{
    helpers::{product, send_request, session_id, with_session},
    mocks::MockBackend,
};
use crate::{
    middleware::{SessionMiddlewareFactory, SESSION_COOKIE},
    routes::{AddCartItemRoute, CartRoute, CartStreamRoute, RemoveCartItemRoute},
};

fn backend_with_mug(stock: i64) -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_find_product().returning(move |id| Ok((id == ProductId(1)).then(|| product(1, "Mug", 1250, stock))));
    backend.expect_find_products().returning(move |ids| {
        Ok(ids.iter().filter(|id| **id == ProductId(1)).map(|_| product(1, "Mug", 1250, stock)).collect())
    });
    backend
}

fn configure_cart(backend: MockBackend, sessions: SessionCartStore) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let notifier: Arc<dyn CartNotifier> = Arc::new(NullNotifier);
        let api = CartApi::new(backend, sessions, notifier);
        cfg.app_data(web::Data::new(api))
            .service(CartRoute::<MockBackend>::new())
            .service(AddCartItemRoute::<MockBackend>::new())
            .service(RemoveCartItemRoute::<MockBackend>::new());
    }
}

#[actix_web::test]
async fn first_add_clamps_to_stock_and_starts_a_session() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    let req = TestRequest::post().uri("/cart_items").set_json(json!({ "product_id": 1, "quantity": 5 }));
    let res = send_request(req, configure_cart(backend_with_mug(3), sessions.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["line_qty"], 3);
    assert_eq!(body["total_qty"], 3);
    assert_eq!(body["cart"]["subtotal"], 3750);
    assert_eq!(body["cart"]["lines"][0]["name"], "Mug");
    let cookie = res.header("set-cookie").expect("No session cookie was issued");
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[actix_web::test]
async fn quantity_defaults_to_one_and_is_capped_at_five() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    let req = with_session(TestRequest::post().uri("/cart_items").set_json(json!({ "product_id": 1 })));
    let res = send_request(req, configure_cart(backend_with_mug(10), sessions.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["line_qty"], 1);
    assert!(res.header("set-cookie").is_none(), "An existing session must not be replaced");

    let body = json!({ "product_id": 1, "quantity": 7 });
    let req = with_session(TestRequest::post().uri("/cart_items").set_json(body));
    let res = send_request(req, configure_cart(backend_with_mug(10), sessions.clone())).await;
    assert_eq!(res.json()["line_qty"], 5);
    assert_eq!(sessions.total_quantity(&session_id()).await, 5);
}

#[actix_web::test]
async fn adding_an_unknown_product_is_a_404() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::post().uri("/cart_items").set_json(json!({ "product_id": 99 })));
    let res = send_request(req, configure_cart(backend_with_mug(10), SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, r#"{"error":"Product 99 does not exist"}"#);
}

#[actix_web::test]
async fn malformed_add_request_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = with_session(TestRequest::post().uri("/cart_items").set_json(json!({ "quantity": 2 })));
    let res = send_request(req, configure_cart(MockBackend::new(), SessionCartStore::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn remove_is_idempotent() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    sessions.add_line(&session_id(), &product(1, "Mug", 1250, 10), 2).await;
    for _ in 0..2 {
        let req = with_session(TestRequest::delete().uri("/cart_items?product_id=1"));
        let res = send_request(req, configure_cart(backend_with_mug(10), sessions.clone())).await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body["product_id"], 1);
        assert_eq!(body["total_qty"], 0);
        assert!(body.get("line_qty").is_none());
    }
}

#[actix_web::test]
async fn remove_without_a_product_returns_the_cart() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    sessions.add_line(&session_id(), &product(1, "Mug", 1250, 10), 2).await;
    let req = with_session(TestRequest::delete().uri("/cart_items"));
    let res = send_request(req, configure_cart(backend_with_mug(10), sessions.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert!(body.get("product_id").is_none());
    assert_eq!(body["total_qty"], 2);
    assert_eq!(body["cart"]["total_quantity"], 2);
    assert_eq!(sessions.total_quantity(&session_id()).await, 2);
}

#[actix_web::test]
async fn cart_view_follows_the_cookie() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    sessions.add_line(&session_id(), &product(1, "Mug", 1250, 10), 2).await;
    let topic = sessions.topic_for(&session_id());

    let req = with_session(TestRequest::get().uri("/cart"));
    let res = send_request(req, configure_cart(backend_with_mug(10), sessions.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["total_quantity"], 2);
    assert_eq!(body["subtotal"], 2500);
    assert_eq!(body["topic_id"], topic.as_str());

    // A visitor without the cookie sees their own, empty cart
    let req = TestRequest::get().uri("/cart");
    let res = send_request(req, configure_cart(backend_with_mug(10), sessions.clone())).await;
    assert_eq!(res.json()["total_quantity"], 0);
    assert_ne!(res.json()["topic_id"], topic.as_str());
    // Looking is not enough to be remembered
    assert_eq!(sessions.session_count().await, 1);
}

#[actix_web::test]
async fn cart_stream_delivers_changes() {
    let _ = env_logger::try_init().ok();
    let sessions = SessionCartStore::new();
    let broadcaster = web::Data::new(CartBroadcaster::default());
    let notifier: Arc<dyn CartNotifier> = broadcaster.clone().into_inner();
    let api = web::Data::new(CartApi::new(MockBackend::new(), sessions.clone(), notifier));
    let app = App::new()
        .wrap(SessionMiddlewareFactory::new(false))
        .app_data(api)
        .app_data(broadcaster.clone())
        .service(CartStreamRoute::<MockBackend>::new());
    let service = test::init_service(app).await;
    let req = with_session(TestRequest::get().uri("/cart/stream")).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("content-type").unwrap(), "text/event-stream");

    let topic = sessions.topic_for(&session_id());
    assert_eq!(broadcaster.subscriber_count(&topic), 1);
    let lines = vec![CartLineView::new(ProductId(1), "Mug".into(), 1250.into(), 2)];
    broadcaster.publish(&topic, CartChanged::new(topic.clone(), CartChangeReason::LineAdded, lines));

    let mut body = Box::pin(res.into_body());
    let chunk = tokio::time::timeout(Duration::from_secs(2), poll_fn(|cx| body.as_mut().poll_next(cx)))
        .await
        .expect("No event arrived")
        .expect("Stream ended")
        .expect("Stream failed");
    let frame = String::from_utf8_lossy(&chunk).into_owned();
    assert!(frame.starts_with("event: cart\ndata: "), "{frame}");
    assert!(frame.ends_with("\n\n"));
    let data = frame.trim_start_matches("event: cart\ndata: ").trim_end();
    let event: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["total_quantity"], 2);
    assert_eq!(event["reason"], "line_added");

    drop(body);
    assert_eq!(broadcaster.subscriber_count(&topic), 0);
    assert_eq!(broadcaster.topic_count(), 0);
    assert_eq!(sessions.session_count().await, 0);
}
