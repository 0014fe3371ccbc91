use actix_web::{
    cookie::Cookie,
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use cart_common::Cents;
use cart_engine::db_types::{Order, OrderLine, OrderToken, Product, ProductId, SessionId};
use chrono::Utc;
use log::debug;

use crate::middleware::{SessionMiddlewareFactory, SESSION_COOKIE};

/// A well-formed session id that tests use as an existing visitor.
pub const SESSION_ID: &str = "5e5510be5e5510be5e5510be5e5510be";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body was not JSON")
    }
}

pub fn session_id() -> SessionId {
    SessionId::from(SESSION_ID)
}

/// Attaches the session cookie for [`SESSION_ID`] to the request.
pub fn with_session(req: TestRequest) -> TestRequest {
    req.cookie(Cookie::new(SESSION_COOKIE, SESSION_ID))
}

pub async fn send_request<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().wrap(SessionMiddlewareFactory::new(false)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = test::read_body(res).await;
    TestResponse { status, headers, body: String::from_utf8_lossy(&body).into_owned() }
}

pub fn product(id: i64, name: &str, price: i64, stock: i64) -> Product {
    Product {
        id: ProductId(id),
        name: name.to_string(),
        description: String::new(),
        price: Cents::from(price),
        stock_quantity: stock,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn order(id: i64, token: &str, paid: bool) -> Order {
    Order { id, token: OrderToken::from(token), paid, created_at: Utc::now(), updated_at: Utc::now() }
}

pub fn order_line(id: i64, order_id: i64, product_id: i64, quantity: i64) -> OrderLine {
    OrderLine { id, order_id, product_id: ProductId(product_id), quantity }
}
