//! Printful print-on-demand API.
//!
//! Without an API key every call is answered locally with a mock result so
//! the rest of the store keeps working while the integration is unconfigured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::fulfillment::{
    FulfillmentOrder, FulfillmentOrderRequest, SyncProduct, SyncProductRequest,
};
use crate::domain::ports::FulfillmentProvider;

const API_BASE: &str = "https://api.printful.com";

pub const MOCK_ORDER_ID: &str = "mock_order_123";

pub struct PrintfulClient {
    http: reqwest::Client,
    api_key: Option<String>,
    store_id: Option<String>,
}

impl PrintfulClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>, store_id: Option<String>) -> Self {
        Self {
            http,
            api_key,
            store_id,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn post(&self, api_key: &str, url: String) -> reqwest::RequestBuilder {
        let req = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .header("X-PF-Language", "en");
        match &self.store_id {
            Some(store_id) => req.header("X-PF-Store-Id", store_id),
            None => req,
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SyncProductBody<'a> {
    sync_product: SyncProductHeader<'a>,
    sync_variants: Vec<SyncVariantBody<'a>>,
}

#[derive(Debug, Serialize)]
struct SyncProductHeader<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SyncVariantBody<'a> {
    variant_id: i64,
    retail_price: &'a str,
    files: Vec<FileBody<'a>>,
}

#[derive(Debug, Serialize)]
struct FileBody<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct OrderBody<'a> {
    external_id: &'a str,
    shipping: &'static str,
    recipient: RecipientBody<'a>,
    items: Vec<OrderItemBody<'a>>,
}

#[derive(Debug, Serialize)]
struct RecipientBody<'a> {
    name: &'a str,
    address1: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    address2: Option<&'a str>,
    city: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_code: Option<&'a str>,
    country_code: &'a str,
    zip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OrderItemBody<'a> {
    sync_variant_id: i64,
    quantity: i32,
    retail_price: &'a str,
}

/// Printful wraps every payload in a `result` key.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct SyncProductResult {
    id: i64,
    #[serde(default)]
    sync_variants: Vec<SyncVariantResult>,
}

#[derive(Debug, Deserialize)]
struct SyncVariantResult {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct OrderResult {
    id: serde_json::Value,
}

async fn read_result<T: for<'de> Deserialize<'de>>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, DomainError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DomainError::upstream(format!(
            "Printful {what} error: {status} - {body}"
        )));
    }
    let envelope: Envelope<T> = resp.json().await?;
    Ok(envelope.result)
}

fn mock_id() -> i64 {
    i64::from(Uuid::new_v4().as_fields().0 >> 1)
}

#[async_trait]
impl FulfillmentProvider for PrintfulClient {
    async fn create_sync_product(&self, request: SyncProductRequest) -> Result<SyncProduct, DomainError> {
        let Some(api_key) = &self.api_key else {
            log::warn!("PRINTFUL_API_KEY is not set; returning a mock sync product");
            return Ok(SyncProduct {
                id: mock_id(),
                variant_ids: request.variants.iter().map(|_| mock_id()).collect(),
            });
        };

        let body = SyncProductBody {
            sync_product: SyncProductHeader {
                name: &request.name,
                thumbnail: request.thumbnail.as_deref(),
            },
            sync_variants: request
                .variants
                .iter()
                .map(|v| SyncVariantBody {
                    variant_id: v.catalog_variant_id,
                    retail_price: &v.retail_price,
                    files: vec![FileBody { url: &v.file_url }],
                })
                .collect(),
        };

        let resp = self
            .post(api_key, format!("{API_BASE}/store/products"))
            .json(&body)
            .send()
            .await?;
        let result: SyncProductResult = read_result(resp, "product creation").await?;

        Ok(SyncProduct {
            id: result.id,
            variant_ids: result.sync_variants.into_iter().map(|v| v.id).collect(),
        })
    }

    async fn create_order(&self, request: FulfillmentOrderRequest) -> Result<FulfillmentOrder, DomainError> {
        let Some(api_key) = &self.api_key else {
            log::warn!("PRINTFUL_API_KEY is not set; returning a mock fulfillment order");
            return Ok(FulfillmentOrder {
                id: MOCK_ORDER_ID.to_string(),
            });
        };

        let recipient = &request.recipient;
        let body = OrderBody {
            external_id: &request.external_id,
            shipping: "STANDARD",
            recipient: RecipientBody {
                name: &recipient.name,
                address1: &recipient.address1,
                address2: recipient.address2.as_deref(),
                city: &recipient.city,
                state_code: recipient.state_code.as_deref(),
                country_code: &recipient.country_code,
                zip: &recipient.zip,
                email: recipient.email.as_deref(),
            },
            items: request
                .items
                .iter()
                .map(|i| OrderItemBody {
                    sync_variant_id: i.sync_variant_id,
                    quantity: i.quantity,
                    retail_price: &i.retail_price,
                })
                .collect(),
        };

        // Orders are created as drafts and confirmed by hand in the Printful dashboard.
        let resp = self
            .post(api_key, format!("{API_BASE}/orders"))
            .query(&[("confirm", "false")])
            .json(&body)
            .send()
            .await?;
        let result: OrderResult = read_result(resp, "order creation").await?;

        let id = match result.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(FulfillmentOrder { id })
    }
}
