use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::ImageUpload;
use crate::domain::product::{ProductChanges, ProductDraft, Variant};
use crate::errors::AppError;
use crate::handlers::auth::AdminAuth;
use crate::handlers::products::{to_responses, ProductResponse, VariantDto};
use crate::AppState;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Major currency units, e.g. 19.99
    #[schema(value_type = f64)]
    pub price: BigDecimal,
    #[serde(default)]
    pub images: Vec<String>,
    /// Legacy single image, used when `images` is empty
    pub image_url: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantDto>,
    #[serde(alias = "printfulSyncProductId")]
    pub fulfillment_sync_product_id: Option<i64>,
}

impl From<CreateProductRequest> for ProductDraft {
    fn from(r: CreateProductRequest) -> Self {
        ProductDraft {
            name: r.name,
            description: r.description,
            price: r.price,
            images: r.images,
            image_url: r.image_url,
            slug: r.slug,
            variants: r.variants.into_iter().map(Variant::from).collect(),
            fulfillment_sync_product_id: r.fulfillment_sync_product_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<BigDecimal>,
    pub images: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub slug: Option<String>,
    pub variants: Option<Vec<VariantDto>>,
    #[serde(alias = "printfulSyncProductId")]
    pub fulfillment_sync_product_id: Option<i64>,
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(r: UpdateProductRequest) -> Self {
        ProductChanges {
            name: r.name,
            description: r.description,
            price: r.price,
            images: r.images,
            image_url: r.image_url,
            slug: r.slug,
            variants: r
                .variants
                .map(|vs| vs.into_iter().map(Variant::from).collect()),
            fulfillment_sync_product_id: r.fulfillment_sync_product_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /admin/products
#[utoipa::path(
    get,
    path = "/admin/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 401, description = "Missing or invalid admin credentials"),
    ),
    tag = "admin"
)]
pub async fn list_products(
    _admin: AdminAuth,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let products = state.catalog.list().await?;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// GET /admin/products/{id}
#[utoipa::path(
    get,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 401, description = "Missing or invalid admin credentials"),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn get_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product = state.catalog.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /admin/products
///
/// Creates the product and links it to the fulfillment provider when possible.
#[utoipa::path(
    post,
    path = "/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product"),
        (status = 401, description = "Missing or invalid admin credentials"),
    ),
    tag = "admin"
)]
pub async fn create_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = state.catalog.create(body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /admin/products/{id}
#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Missing or invalid admin credentials"),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn update_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product = state
        .catalog
        .update(path.into_inner(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /admin/products/{id}
///
/// Also removes the product's images from the image host.
#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Missing or invalid admin credentials"),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn delete_product(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.catalog.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reads the first file part of the form, enforcing the image type and size limit.
async fn read_image(mut payload: Multipart) -> Result<ImageUpload, AppError> {
    let bad_form = |e: actix_multipart::MultipartError| AppError::Validation(e.to_string());

    while let Some(mut field) = payload.try_next().await.map_err(bad_form)? {
        let Some(file_name) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
        else {
            continue;
        };

        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation("Only image files are allowed".to_string()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_form)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Validation("Image exceeds the 5MB limit".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(ImageUpload {
            bytes,
            file_name,
            content_type,
        });
    }

    Err(AppError::Validation("Image file is required".to_string()))
}

/// POST /admin/products/upload
#[utoipa::path(
    post,
    path = "/admin/products/upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Form with one image file"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing, oversized or non-image file"),
        (status = 401, description = "Missing or invalid admin credentials"),
        (status = 500, description = "Image host failure"),
    ),
    tag = "admin"
)]
pub async fn upload_image(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let image = read_image(payload).await?;
    let url = state.catalog.upload_image(image).await?;
    Ok(HttpResponse::Ok().json(UploadResponse { url }))
}
