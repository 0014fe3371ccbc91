use std::sync::Arc;

use log::*;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::{
    config::StripeConfig,
    data_objects::{CheckoutSession, NewCheckoutSession},
    helpers::{checkout_session_form, error_message},
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for StripeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StripeApi ({})", self.config.api_url)
    }
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeApiError> {
        if !self.is_configured() {
            return Err(StripeApiError::NotConfigured);
        }
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url).basic_auth(self.config.secret_key.reveal(), None::<&str>);
        if !form.is_empty() {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestRequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            let message = error_message(&body);
            warn!("💳️ Payment processor rejected the request ({status}): {message}");
            Err(StripeApiError::QueryError { status, message })
        }
    }

    /// Creates a hosted checkout session. The returned session is guaranteed to carry a payment page URL.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        let form = checkout_session_form(session, &self.config.currency);
        debug!("💳️ Creating checkout session with {} line items", session.line_items.len());
        let result = self.rest_query::<CheckoutSession>(Method::POST, "/checkout/sessions", &form).await?;
        if result.url.is_none() {
            return Err(StripeApiError::MissingRedirectUrl(result.id));
        }
        info!("💳️ Created checkout session {}", result.id);
        Ok(result)
    }
}
