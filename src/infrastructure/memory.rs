//! In-memory adapters used by service and handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::analytics::{AnalyticsFilter, TrafficSource};
use crate::domain::errors::DomainError;
use crate::domain::fulfillment::{
    FulfillmentOrder, FulfillmentOrderRequest, SyncProduct, SyncProductRequest,
};
use crate::domain::order::{NewOrder, Order, OrderStatus, PaymentConfirmation};
use crate::domain::payment::{CheckoutSession, CheckoutSessionRequest, PaymentEvent};
use crate::domain::ports::{
    FulfillmentProvider, ImageHost, ImageUpload, OrderRepository, PaidSummary, PaymentGateway,
    ProductRepository, TrackingRepository,
};
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::domain::tracking::{EventType, NewTrackingEvent, TrackingEvent};
use crate::infrastructure::stripe::{parse_event, verify_webhook_signature};

pub const WEBHOOK_SECRET: &str = "whsec_test";
pub const SESSION_ID: &str = "cs_test_123";
pub const CLIENT_SECRET: &str = "secret_123";

#[derive(Default)]
pub struct InMemoryProducts {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProducts {
    pub fn insert(&self, product: NewProduct) -> Product {
        self.create(product).expect("in-memory insert")
    }
}

impl ProductRepository for InMemoryProducts {
    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.reverse();
        Ok(rows)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.slug == slug).cloned())
    }

    fn find_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| (p.id, p.name.clone()))
            .collect())
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|p| p.slug == product.slug) {
            return Err(DomainError::validation("A product with this slug already exists"));
        }
        let now = Utc::now();
        let created = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            images: product.images,
            slug: product.slug,
            variants: product.variants,
            fulfillment_sync_product_id: product.fulfillment_sync_product_id,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(product) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(images) = changes.images {
            product.images = images;
        }
        if let Some(slug) = changes.slug {
            product.slug = slug;
        }
        if let Some(variants) = changes.variants {
            product.variants = variants;
        }
        if let Some(sync_id) = changes.fulfillment_sync_product_id {
            product.fulfillment_sync_product_id = Some(sync_id);
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let removed = rows
            .iter()
            .position(|p| p.id == id)
            .map(|idx| rows.remove(idx));
        Ok(removed)
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    rows: Mutex<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn all(&self) -> Vec<Order> {
        self.rows.lock().unwrap().clone()
    }

    fn paid<'a>(rows: &'a [Order], filter: &'a AnalyticsFilter) -> impl Iterator<Item = &'a Order> + 'a {
        rows.iter().filter(move |o| {
            o.status == OrderStatus::Paid
                && filter.contains(o.created_at)
                && filter.product_id.map_or(true, |pid| pid == o.product_id)
        })
    }
}

impl OrderRepository for InMemoryOrders {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            product_id: order.product_id,
            quantity: order.quantity,
            variant: order.variant.filter(|v| !v.is_empty()),
            payment_session_id: order.payment_session_id,
            status: OrderStatus::Pending,
            amount_total: order.amount_total,
            customer: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.payment_session_id == session_id)
            .cloned())
    }

    fn mark_paid(&self, confirmation: &PaymentConfirmation) -> Result<Option<Order>, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(order) = rows.iter_mut().find(|o| {
            o.payment_session_id == confirmation.payment_session_id && o.status == OrderStatus::Pending
        }) else {
            return Ok(None);
        };
        order.status = OrderStatus::Paid;
        if let Some(amount) = confirmation.amount_total {
            order.amount_total = amount;
        }
        order.customer = confirmation.customer.clone();
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    fn paid_summary(&self, filter: &AnalyticsFilter) -> Result<PaidSummary, DomainError> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::paid(&rows, filter).fold(PaidSummary::default(), |acc, o| PaidSummary {
            count: acc.count + 1,
            revenue: acc.revenue + o.amount_total,
        }))
    }

    fn top_products(&self, filter: &AnalyticsFilter, limit: i64) -> Result<Vec<(Uuid, i64)>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for order in Self::paid(&rows, filter) {
            *counts.entry(order.product_id).or_default() += 1;
        }
        let mut ranked: Vec<_> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }
}

#[derive(Default)]
pub struct InMemoryTracking {
    rows: Mutex<Vec<TrackingEvent>>,
}

impl InMemoryTracking {
    fn matches(event: &TrackingEvent, filter: &AnalyticsFilter) -> bool {
        filter.contains(event.created_at)
            && filter
                .product_id
                .map_or(true, |pid| event.product_id.as_deref() == Some(pid.to_string().as_str()))
    }
}

impl TrackingRepository for InMemoryTracking {
    fn record(&self, event: NewTrackingEvent) -> Result<TrackingEvent, DomainError> {
        let recorded = TrackingEvent {
            id: Uuid::new_v4(),
            event_type: event.event_type,
            product_id: event.product_id,
            source: event.source,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(recorded.clone());
        Ok(recorded)
    }

    fn count(&self, filter: &AnalyticsFilter, event_type: EventType) -> Result<i64, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type && Self::matches(e, filter))
            .count() as i64)
    }

    fn top_sources(&self, filter: &AnalyticsFilter, limit: i64) -> Result<Vec<TrafficSource>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for event in rows.iter().filter(|e| Self::matches(e, filter)) {
            if let Some(source) = event.source.as_ref().filter(|s| !s.is_empty()) {
                *counts.entry(source.clone()).or_default() += 1;
            }
        }
        let mut ranked: Vec<_> = counts
            .into_iter()
            .map(|(source, visits)| TrafficSource { source, visits })
            .collect();
        ranked.sort_by(|a, b| b.visits.cmp(&a.visits));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }
}

/// Payment gateway that hands out a fixed session and verifies webhooks with [`WEBHOOK_SECRET`].
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<CheckoutSessionRequest>>,
    pub fail: bool,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, DomainError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(DomainError::upstream("card network on fire"));
        }
        Ok(CheckoutSession {
            id: SESSION_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
        })
    }

    fn verify_event(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent, DomainError> {
        verify_webhook_signature(payload, signature_header, WEBHOOK_SECRET)
            .map_err(|e| DomainError::validation(format!("Webhook Error: {e}")))?;
        parse_event(payload)
    }
}

#[derive(Default)]
pub struct FakeFulfillment {
    pub synced: Mutex<Vec<SyncProductRequest>>,
    pub orders: Mutex<Vec<FulfillmentOrderRequest>>,
    pub fail: bool,
}

impl FakeFulfillment {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl FulfillmentProvider for FakeFulfillment {
    async fn create_sync_product(&self, request: SyncProductRequest) -> Result<SyncProduct, DomainError> {
        let count = request.variants.len() as i64;
        self.synced.lock().unwrap().push(request);
        if self.fail {
            return Err(DomainError::upstream("fulfillment offline"));
        }
        Ok(SyncProduct {
            id: 1000,
            variant_ids: (1..=count).map(|i| 2000 + i).collect(),
        })
    }

    async fn create_order(&self, request: FulfillmentOrderRequest) -> Result<FulfillmentOrder, DomainError> {
        self.orders.lock().unwrap().push(request);
        if self.fail {
            return Err(DomainError::upstream("fulfillment offline"));
        }
        Ok(FulfillmentOrder {
            id: "pf_1".to_string(),
        })
    }
}

#[derive(Default)]
pub struct FakeImageHost {
    pub uploads: Mutex<Vec<ImageUpload>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, DomainError> {
        let url = format!("https://img.example.com/{}", image.file_name);
        self.uploads.lock().unwrap().push(image);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
