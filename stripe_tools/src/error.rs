use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The payment processor secret key has not been configured")]
    NotConfigured,
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("{message}")]
    QueryError { status: u16, message: String },
    #[error("The checkout session {0} did not include a payment page URL")]
    MissingRedirectUrl(String),
}
