mod session;

pub use session::{SessionContext, SessionMiddlewareFactory, SessionMiddlewareService, SESSION_COOKIE};
