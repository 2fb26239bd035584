use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// Column width of `orders.variant_size` / `orders.variant_color`.
pub const MAX_VARIANT_FIELD_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "failed" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}

/// The size/color a customer picked at checkout. Either part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChosenVariant {
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.color.is_none()
    }

    /// Trims both parts, drops blank ones and rejects parts wider than the order columns.
    pub fn normalize(self) -> Result<Self, DomainError> {
        fn part(value: Option<String>, field: &str) -> Result<Option<String>, DomainError> {
            let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
                return Ok(None);
            };
            if value.chars().count() > MAX_VARIANT_FIELD_LEN {
                return Err(DomainError::validation(format!(
                    "Variant {field} must be at most {MAX_VARIANT_FIELD_LEN} characters"
                )));
            }
            Ok(Some(value))
        }
        Ok(ChosenVariant {
            size: part(self.size, "size")?,
            color: part(self.color, "color")?,
        })
    }

    /// "M - Black", "M", or "" depending on which parts are present.
    pub fn label(&self) -> String {
        [self.size.as_deref(), self.color.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub variant: Option<ChosenVariant>,
    pub payment_session_id: String,
    pub status: OrderStatus,
    /// Minor currency units.
    pub amount_total: i64,
    pub customer: Option<CustomerDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: Uuid,
    pub quantity: i32,
    pub variant: Option<ChosenVariant>,
    pub payment_session_id: String,
    pub amount_total: i64,
}

/// Authoritative values reported by the payment provider once a session completes.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment_session_id: String,
    pub amount_total: Option<i64>,
    pub customer: Option<CustomerDetails>,
}
