use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PageView,
    ViewProduct,
    InitiateCheckout,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageView => "page_view",
            EventType::ViewProduct => "view_product",
            EventType::InitiateCheckout => "initiate_checkout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page_view" => Some(EventType::PageView),
            "view_product" => Some(EventType::ViewProduct),
            "initiate_checkout" => Some(EventType::InitiateCheckout),
            _ => None,
        }
    }
}

/// Append-only funnel event.
#[derive(Debug, Clone)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub product_id: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTrackingEvent {
    pub event_type: EventType,
    pub product_id: Option<String>,
    pub source: Option<String>,
}
