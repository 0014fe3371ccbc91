use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use cart_engine::{db_types::ProductId, CartApiError, CheckoutError, SettlementError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("No session is attached to this request")]
    MissingSession,
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("{0}")]
    CheckoutRefused(String),
    #[error("{0}")]
    PaymentGatewayError(String),
    #[error("{0}")]
    PaymentGatewayUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ProductNotFound(_) => StatusCode::NOT_FOUND,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::CheckoutRefused(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PaymentGatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::PaymentGatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::ProductNotFound(id) => Self::ProductNotFound(id),
            CartApiError::CatalogError(e) => {
                error!("💻️ Catalog failure. {e}");
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::NoValidLines => Self::CheckoutRefused(e.to_string()),
            CheckoutError::Gateway(_) => Self::PaymentGatewayError(e.to_string()),
            CheckoutError::GatewayNotConfigured => Self::PaymentGatewayUnavailable(e.to_string()),
            CheckoutError::DatabaseError(e) => Self::BackendError(e),
        }
    }
}

impl From<SettlementError> for ServerError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::DatabaseError(e) => Self::BackendError(e),
        }
    }
}
