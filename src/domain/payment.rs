use uuid::Uuid;

use super::order::{ChosenVariant, PaymentConfirmation};

/// Countries the payment page collects shipping addresses for.
pub const SHIPPING_COUNTRIES: [&str; 6] = ["US", "CA", "ES", "GB", "DE", "FR"];

pub const CURRENCY: &str = "usd";

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub product_id: Uuid,
    pub product_name: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub variant: Option<ChosenVariant>,
    /// Minor currency units per item.
    pub unit_amount: i64,
    pub quantity: i32,
    pub return_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingDetails {
    pub name: Option<String>,
    pub address: PostalAddress,
}

#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub confirmation: PaymentConfirmation,
    pub shipping: Option<ShippingDetails>,
}

/// A verified payment-provider notification.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    CheckoutSessionCompleted(CompletedSession),
    Other(String),
}
