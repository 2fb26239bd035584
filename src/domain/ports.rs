use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::analytics::{AnalyticsFilter, TrafficSource};
use super::errors::DomainError;
use super::fulfillment::{FulfillmentOrder, FulfillmentOrderRequest, SyncProduct, SyncProductRequest};
use super::order::{NewOrder, Order, PaymentConfirmation};
use super::payment::{CheckoutSession, CheckoutSessionRequest, PaymentEvent};
use super::product::{NewProduct, Product, ProductChanges};
use super::tracking::{EventType, NewTrackingEvent, TrackingEvent};

pub trait ProductRepository: Send + Sync + 'static {
    /// Newest first.
    fn list(&self) -> Result<Vec<Product>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError>;
    fn find_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError>;
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, DomainError>;
    /// Returns the deleted product, if it existed.
    fn delete(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaidSummary {
    pub count: i64,
    /// Minor currency units.
    pub revenue: i64,
}

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError>;
    /// Moves a pending order to paid. Returns `None` when no pending order has that session.
    fn mark_paid(&self, confirmation: &PaymentConfirmation) -> Result<Option<Order>, DomainError>;
    fn paid_summary(&self, filter: &AnalyticsFilter) -> Result<PaidSummary, DomainError>;
    /// (product id, paid order count), highest count first.
    fn top_products(&self, filter: &AnalyticsFilter, limit: i64) -> Result<Vec<(Uuid, i64)>, DomainError>;
}

pub trait TrackingRepository: Send + Sync + 'static {
    fn record(&self, event: NewTrackingEvent) -> Result<TrackingEvent, DomainError>;
    fn count(&self, filter: &AnalyticsFilter, event_type: EventType) -> Result<i64, DomainError>;
    /// Non-empty sources by event count, highest first.
    fn top_sources(&self, filter: &AnalyticsFilter, limit: i64) -> Result<Vec<TrafficSource>, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, DomainError>;

    /// Verifies the signature over the raw body and decodes the event.
    fn verify_event(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent, DomainError>;
}

#[async_trait]
pub trait FulfillmentProvider: Send + Sync + 'static {
    async fn create_sync_product(&self, request: SyncProductRequest) -> Result<SyncProduct, DomainError>;
    async fn create_order(&self, request: FulfillmentOrderRequest) -> Result<FulfillmentOrder, DomainError>;
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

#[async_trait]
pub trait ImageHost: Send + Sync + 'static {
    /// Returns the public URL of the stored image.
    async fn upload(&self, image: ImageUpload) -> Result<String, DomainError>;
    async fn delete(&self, url: &str) -> Result<(), DomainError>;
}
