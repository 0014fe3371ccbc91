use actix_web::{
    http::header::{self, HeaderValue},
    HttpRequest,
    HttpResponse,
};

/// True if the client asked for a JSON answer rather than a page navigation.
pub fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get_all(header::ACCEPT)
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(',').any(|t| t.trim().starts_with("application/json")))
}

/// `303 See Other` to `location`.
pub fn see_other(location: &str) -> HttpResponse {
    match HeaderValue::from_str(location) {
        Ok(value) => HttpResponse::SeeOther().insert_header((header::LOCATION, value)).finish(),
        Err(_) => HttpResponse::SeeOther().insert_header((header::LOCATION, "/cart")).finish(),
    }
}

/// Sends the shopper back to their cart with a message to display.
pub fn redirect_with_alert(message: &str) -> HttpResponse {
    see_other(&format!("/cart?alert={}", urlencoding::encode(message)))
}
