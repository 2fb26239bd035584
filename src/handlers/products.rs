use actix_web::{web, HttpResponse};
use bigdecimal::ToPrimitive;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::product::{Product, Variant};
use crate::errors::AppError;
use crate::AppState;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantDto {
    pub size: String,
    pub color: String,
    pub stock: i32,
    /// Sync variant id at the fulfillment provider
    #[serde(
        default,
        alias = "printfulVariantId",
        skip_serializing_if = "Option::is_none"
    )]
    pub fulfillment_variant_id: Option<i64>,
}

impl From<VariantDto> for Variant {
    fn from(v: VariantDto) -> Self {
        Variant {
            size: v.size,
            color: v.color,
            stock: v.stock,
            fulfillment_variant_id: v.fulfillment_variant_id,
        }
    }
}

impl From<Variant> for VariantDto {
    fn from(v: Variant) -> Self {
        VariantDto {
            size: v.size,
            color: v.color,
            stock: v.stock,
            fulfillment_variant_id: v.fulfillment_variant_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Major currency units
    pub price: f64,
    pub images: Vec<String>,
    pub slug: String,
    pub variants: Vec<VariantDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_sync_product_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_f64().unwrap_or_default(),
            images: p.images,
            slug: p.slug,
            variants: p.variants.into_iter().map(VariantDto::from).collect(),
            fulfillment_sync_product_id: p.fulfillment_sync_product_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

pub(crate) fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(ProductResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products, newest first", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = state.catalog.list().await?;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// GET /products/{id_or_slug}
#[utoipa::path(
    get,
    path = "/products/{id_or_slug}",
    params(
        ("id_or_slug" = String, Path, description = "Product UUID or slug"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product = state.catalog.get_by_id_or_slug(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}
