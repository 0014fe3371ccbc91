//! Session middleware.
//!
//! Identifies the visitor's browsing session from the `cart_session` cookie and makes it available to handlers as a
//! [`SessionContext`]. Visitors without a (well-formed) cookie get a fresh random session id, and the cookie is set on
//! the way out.
//!
//! This is the only place that knows how sessions are carried over HTTP. Handlers receive the session explicitly as
//! an extractor argument.
use std::{pin::Pin, rc::Rc};

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    FromRequest,
    HttpMessage,
    HttpRequest,
};
use cart_engine::{db_types::SessionId, helpers::new_session_id};
use futures::{
    future::{ok, ready, Ready},
    Future,
};
use log::*;

use crate::errors::ServerError;

pub const SESSION_COOKIE: &str = "cart_session";
const SESSION_ID_LENGTH: usize = 32;

/// The session a request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: SessionId,
    /// True if the session was created by this request.
    pub is_new: bool,
}

impl SessionContext {
    fn from_cookie_value(value: Option<&str>) -> Self {
        match value.filter(|v| is_well_formed(v)) {
            Some(id) => Self { session_id: SessionId::from(id), is_new: false },
            None => Self { session_id: new_session_id(), is_new: true },
        }
    }
}

fn is_well_formed(id: &str) -> bool {
    id.len() == SESSION_ID_LENGTH && id.chars().all(|c| c.is_ascii_hexdigit())
}

impl FromRequest for SessionContext {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let context = req.extensions().get::<SessionContext>().cloned().ok_or_else(|| {
            error!("🍪️ No session context in request extensions. Is the session middleware installed?");
            ServerError::MissingSession
        });
        ready(context)
    }
}

pub struct SessionMiddlewareFactory {
    secure: bool,
}

impl SessionMiddlewareFactory {
    pub fn new(secure: bool) -> Self {
        SessionMiddlewareFactory { secure }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionMiddlewareService { secure: self.secure, service: Rc::new(service) })
    }
}

pub struct SessionMiddlewareService<S> {
    secure: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secure = self.secure;
        let cookie = req.cookie(SESSION_COOKIE);
        let context = SessionContext::from_cookie_value(cookie.as_ref().map(|c| c.value()));
        if context.is_new {
            trace!("🍪️ New session started for {}", req.path());
        }
        req.extensions_mut().insert(context.clone());
        Box::pin(async move {
            let mut res = service.call(req).await?;
            if context.is_new {
                let cookie = Cookie::build(SESSION_COOKIE, context.session_id.as_str().to_string())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .secure(secure)
                    .finish();
                if let Err(e) = res.response_mut().add_cookie(&cookie) {
                    warn!("🍪️ Could not set the session cookie. {e}");
                }
            }
            Ok(res)
        })
    }
}
