//! Stripe integration via REST API (no SDK dependency)

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerDetails, PaymentConfirmation};
use crate::domain::payment::{
    CheckoutSession, CheckoutSessionRequest, CompletedSession, PaymentEvent, PostalAddress,
    ShippingDetails, CURRENCY, SHIPPING_COUNTRIES,
};
use crate::domain::ports::PaymentGateway;

const API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum age of a signed webhook before it is rejected as a replay.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, secret_key: String, webhook_secret: String) -> Self {
        Self {
            http,
            secret_key,
            webhook_secret,
        }
    }
}

/// Form fields for an embedded, one-off payment session.
pub fn checkout_session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let item = "line_items[0]";
    let product = format!("{item}[price_data][product_data]");
    let mut form = vec![
        ("ui_mode".to_string(), "embedded".to_string()),
        ("mode".to_string(), "payment".to_string()),
        (format!("{item}[price_data][currency]"), CURRENCY.to_string()),
        (
            format!("{item}[price_data][unit_amount]"),
            request.unit_amount.to_string(),
        ),
        (format!("{item}[quantity]"), request.quantity.to_string()),
        (format!("{product}[name]"), request.product_name.clone()),
        (
            format!("{product}[metadata][productId]"),
            request.product_id.to_string(),
        ),
        ("return_url".to_string(), request.return_url.clone()),
    ];
    if let Some(description) = &request.description {
        form.push((format!("{product}[description]"), description.clone()));
    }
    for (i, image) in request.images.iter().enumerate() {
        form.push((format!("{product}[images][{i}]"), image.clone()));
    }
    if let Some(variant) = &request.variant {
        let encoded = serde_json::to_string(variant).unwrap_or_default();
        form.push((format!("{product}[metadata][variant]"), encoded));
    }
    for (i, country) in SHIPPING_COUNTRIES.iter().enumerate() {
        form.push((
            format!("shipping_address_collection[allowed_countries][{i}]"),
            country.to_string(),
        ));
    }
    form
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    client_secret: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, DomainError> {
        let resp = self
            .http
            .post(format!("{API_BASE}/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&checkout_session_form(&request))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::upstream(format!(
                "Stripe create_checkout_session failed ({status}): {body}"
            )));
        }

        let session: SessionResponse = resp.json().await?;
        let client_secret = session.client_secret.ok_or_else(|| {
            DomainError::upstream(format!("Stripe session {} has no client_secret", session.id))
        })?;
        Ok(CheckoutSession {
            id: session.id,
            client_secret,
        })
    }

    fn verify_event(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent, DomainError> {
        verify_webhook_signature(payload, signature_header, &self.webhook_secret)
            .map_err(|e| DomainError::validation(format!("Webhook Error: {e}")))?;
        parse_event(payload)
    }
}

/// Verify Stripe webhook signature (HMAC-SHA256)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Several v1 entries are sent while a signing secret is being rolled.
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    id: String,
    amount_total: Option<i64>,
    customer_details: Option<CustomerDetails>,
    shipping_details: Option<RawShipping>,
    collected_information: Option<RawCollectedInformation>,
}

#[derive(Debug, Deserialize)]
struct RawCollectedInformation {
    shipping_details: Option<RawShipping>,
}

#[derive(Debug, Deserialize)]
struct RawShipping {
    name: Option<String>,
    address: Option<RawAddress>,
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    line1: Option<String>,
    line2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    postal_code: Option<String>,
}

impl RawShipping {
    /// A usable address needs at least a street line and a country.
    fn into_details(self) -> Option<ShippingDetails> {
        let address = self.address?;
        Some(ShippingDetails {
            name: self.name,
            address: PostalAddress {
                line1: address.line1.filter(|l| !l.is_empty())?,
                line2: address.line2.filter(|l| !l.is_empty()),
                city: address.city.unwrap_or_default(),
                state: address.state.filter(|s| !s.is_empty()),
                country: address.country.filter(|c| !c.is_empty())?,
                postal_code: address.postal_code.unwrap_or_default(),
            },
        })
    }
}

/// Decodes a verified event body.
pub fn parse_event(payload: &[u8]) -> Result<PaymentEvent, DomainError> {
    let event: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| DomainError::validation(format!("Webhook Error: {e}")))?;

    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        return Ok(PaymentEvent::Other(event.event_type));
    }

    let session: RawSession = serde_json::from_value(event.data.object)
        .map_err(|e| DomainError::validation(format!("Webhook Error: {e}")))?;
    let shipping = session
        .shipping_details
        .or_else(|| session.collected_information.and_then(|c| c.shipping_details))
        .and_then(RawShipping::into_details);

    Ok(PaymentEvent::CheckoutSessionCompleted(CompletedSession {
        confirmation: PaymentConfirmation {
            payment_session_id: session.id,
            amount_total: session.amount_total,
            customer: session.customer_details,
        },
        shipping,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::order::ChosenVariant;

    pub(crate) fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, "whsec_test", now());
        assert!(verify_webhook_signature(payload, &header, "whsec_test").is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, "whsec_other", now());
        assert_eq!(
            verify_webhook_signature(payload, &header, "whsec_test"),
            Err("Webhook signature mismatch")
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let header = sign(br#"{"amount_total":100}"#, "whsec_test", now());
        assert!(verify_webhook_signature(br#"{"amount_total":1}"#, &header, "whsec_test").is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = b"{}";
        let header = sign(payload, "whsec_test", now() - 600);
        assert_eq!(
            verify_webhook_signature(payload, &header, "whsec_test"),
            Err("Webhook timestamp outside tolerance")
        );
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for header in ["", "garbage", "t=1234567890", "v1=abcd"] {
            assert!(verify_webhook_signature(b"{}", header, "whsec_test").is_err());
        }
    }

    #[test]
    fn any_matching_v1_entry_is_enough() {
        let payload = b"{}";
        let ts = now();
        let good = sign(payload, "whsec_test", ts);
        let header = format!("t={ts},v1=deadbeef,{}", good.split(',').nth(1).unwrap());
        assert!(verify_webhook_signature(payload, &header, "whsec_test").is_ok());
    }

    #[test]
    fn completed_session_is_decoded_with_shipping() {
        let payload = json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "amount_total": 2000,
                "customer_details": { "email": "test@example.com", "name": "Pepe" },
                "shipping_details": {
                    "name": "Pepe Frog",
                    "address": {
                        "line1": "1 Meme St", "line2": null, "city": "Austin",
                        "state": "TX", "country": "US", "postal_code": "73301"
                    }
                }
            }}
        })
        .to_string();

        let PaymentEvent::CheckoutSessionCompleted(done) = parse_event(payload.as_bytes()).unwrap() else {
            panic!("expected a completed session");
        };
        assert_eq!(done.confirmation.payment_session_id, "cs_test_1");
        assert_eq!(done.confirmation.amount_total, Some(2000));
        assert_eq!(
            done.confirmation.customer.unwrap().email.as_deref(),
            Some("test@example.com")
        );
        let shipping = done.shipping.unwrap();
        assert_eq!(shipping.name.as_deref(), Some("Pepe Frog"));
        assert_eq!(shipping.address.line1, "1 Meme St");
        assert_eq!(shipping.address.line2, None);
    }

    #[test]
    fn shipping_falls_back_to_collected_information() {
        let payload = json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_2",
                "collected_information": { "shipping_details": {
                    "name": "Wojak",
                    "address": { "line1": "2 Feels Ave", "city": "Berlin", "country": "DE", "postal_code": "10115" }
                }}
            }}
        })
        .to_string();

        let PaymentEvent::CheckoutSessionCompleted(done) = parse_event(payload.as_bytes()).unwrap() else {
            panic!("expected a completed session");
        };
        assert_eq!(done.shipping.unwrap().address.country, "DE");
        assert!(done.confirmation.customer.is_none());
    }

    #[test]
    fn other_event_types_are_passed_through() {
        let payload = json!({ "type": "payment_intent.created", "data": { "object": {} } }).to_string();
        assert!(matches!(
            parse_event(payload.as_bytes()).unwrap(),
            PaymentEvent::Other(t) if t == "payment_intent.created"
        ));
    }

    #[test]
    fn session_form_embeds_product_and_variant() {
        let request = CheckoutSessionRequest {
            product_id: Uuid::nil(),
            product_name: "Doge Hoodie".to_string(),
            description: Some("Variant: M - Black".to_string()),
            images: vec!["https://img.example.com/doge.png".to_string()],
            variant: Some(ChosenVariant {
                size: Some("M".to_string()),
                color: Some("Black".to_string()),
            }),
            unit_amount: 3500,
            quantity: 2,
            return_url: "http://localhost:3000/return?session_id={CHECKOUT_SESSION_ID}".to_string(),
        };
        let form = checkout_session_form(&request);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("ui_mode"), Some("embedded"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("3500"));
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
        assert_eq!(
            get("line_items[0][price_data][product_data][metadata][variant]"),
            Some(r#"{"size":"M","color":"Black"}"#)
        );
        assert_eq!(
            get("line_items[0][price_data][product_data][images][0]"),
            Some("https://img.example.com/doge.png")
        );
        assert_eq!(get("shipping_address_collection[allowed_countries][5]"), Some("FR"));
    }
}
