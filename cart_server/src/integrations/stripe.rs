use cart_engine::traits::{GatewayCheckoutRequest, GatewayError, GatewaySession, PaymentGateway};
use log::*;
use stripe_tools::{CheckoutLineItem, NewCheckoutSession, StripeApi, StripeApiError, StripeConfig};

/// [`PaymentGateway`] backed by hosted checkout sessions.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self { api })
    }
}

fn to_gateway_error(e: StripeApiError) -> GatewayError {
    match e {
        StripeApiError::NotConfigured => GatewayError::NotConfigured,
        StripeApiError::QueryError { message, .. } => GatewayError::Rejected(message),
        other => GatewayError::Unavailable(other.to_string()),
    }
}

impl PaymentGateway for StripeGateway {
    fn is_configured(&self) -> bool {
        self.api.is_configured()
    }

    async fn create_checkout_session(&self, request: GatewayCheckoutRequest) -> Result<GatewaySession, GatewayError> {
        let line_items = request
            .line_items
            .into_iter()
            .map(|item| CheckoutLineItem::new(item.name, item.unit_amount, item.quantity))
            .collect();
        let session = NewCheckoutSession {
            line_items,
            success_url: request.success_url,
            cancel_url: request.cancel_url,
            client_reference_id: Some(request.order_token.to_string()),
        };
        let result = self.api.create_checkout_session(&session).await.map_err(to_gateway_error)?;
        let redirect_url = result.url.ok_or_else(|| {
            error!("💳️ Checkout session {} has no payment page", result.id);
            GatewayError::Unavailable(format!("Checkout session {} has no payment page", result.id))
        })?;
        Ok(GatewaySession { redirect_url, session_handle: result.id })
    }
}
