//! The processor's REST API takes `application/x-www-form-urlencoded` bodies with bracketed keys for nested values.
use crate::data_objects::{ErrorEnvelope, NewCheckoutSession};

/// Flattens a checkout session request into the bracketed form fields the processor expects.
pub fn checkout_session_form(session: &NewCheckoutSession, currency: &str) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), session.success_url.clone()),
        ("cancel_url".to_string(), session.cancel_url.clone()),
    ];
    if let Some(reference) = &session.client_reference_id {
        form.push(("client_reference_id".to_string(), reference.clone()));
    }
    for (i, item) in session.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[price_data][currency]"), currency.to_string()));
        form.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
        form.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.value().to_string()));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    form
}

/// Extracts the human-readable message from an error response body, falling back to the raw body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match (envelope.error.message, envelope.error.error_type) {
            (Some(message), _) => message,
            (None, Some(error_type)) => error_type,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
