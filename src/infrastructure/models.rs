use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ChosenVariant, CustomerDetails, Order, OrderStatus};
use crate::domain::product::{Product, Variant};
use crate::domain::tracking::{EventType, TrackingEvent};
use crate::schema::{orders, products, tracking_events};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub images: Vec<String>,
    pub slug: String,
    pub variants: Value,
    pub fulfillment_sync_product_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub images: Vec<String>,
    pub slug: String,
    pub variants: Value,
    pub fulfillment_sync_product_id: Option<i64>,
}

/// `None` fields are left untouched by diesel.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub images: Option<Vec<String>>,
    pub slug: Option<String>,
    pub variants: Option<Value>,
    pub fulfillment_sync_product_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let variants: Vec<Variant> = serde_json::from_value(row.variants).map_err(|e| {
            DomainError::Internal(format!("Corrupt variants on product {}: {}", row.id, e))
        })?;
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            images: row.images,
            slug: row.slug,
            variants,
            fulfillment_sync_product_id: row.fulfillment_sync_product_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn variants_to_json(variants: &[Variant]) -> Result<Value, DomainError> {
    serde_json::to_value(variants).map_err(|e| DomainError::Internal(e.to_string()))
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub variant_size: Option<String>,
    pub variant_color: Option<String>,
    pub payment_session_id: String,
    pub status: String,
    pub amount_total: i64,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub variant_size: Option<String>,
    pub variant_color: Option<String>,
    pub payment_session_id: String,
    pub status: String,
    pub amount_total: i64,
}

/// Outer `None` skips a column, `Some(None)` clears it.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct PaymentChangeset {
    pub status: String,
    pub amount_total: Option<i64>,
    pub customer_email: Option<Option<String>>,
    pub customer_name: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status).ok_or_else(|| {
            DomainError::Internal(format!("Unknown status '{}' on order {}", row.status, row.id))
        })?;
        let variant = ChosenVariant {
            size: row.variant_size,
            color: row.variant_color,
        };
        let customer = if row.customer_email.is_some() || row.customer_name.is_some() {
            Some(CustomerDetails {
                email: row.customer_email,
                name: row.customer_name,
            })
        } else {
            None
        };
        Ok(Order {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            variant: (!variant.is_empty()).then_some(variant),
            payment_session_id: row.payment_session_id,
            status,
            amount_total: row.amount_total,
            customer,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tracking_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrackingEventRow {
    pub id: Uuid,
    pub event_type: String,
    pub product_id: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tracking_events)]
pub struct NewTrackingEventRow {
    pub id: Uuid,
    pub event_type: String,
    pub product_id: Option<String>,
    pub source: Option<String>,
}

impl TryFrom<TrackingEventRow> for TrackingEvent {
    type Error = DomainError;

    fn try_from(row: TrackingEventRow) -> Result<Self, Self::Error> {
        let event_type = EventType::parse(&row.event_type).ok_or_else(|| {
            DomainError::Internal(format!("Unknown event type '{}'", row.event_type))
        })?;
        Ok(TrackingEvent {
            id: row.id,
            event_type,
            product_id: row.product_id,
            source: row.source,
            created_at: row.created_at,
        })
    }
}
