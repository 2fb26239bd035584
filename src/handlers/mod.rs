pub mod admin_products;
pub mod analytics;
pub mod auth;
pub mod checkout;
pub mod products;
pub mod webhook;

use actix_web::{web, HttpResponse};
use serde_json::json;
use utoipa::OpenApi;

use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        products::list_products,
        products::get_product,
        checkout::create_checkout,
        webhook::stripe_webhook,
        analytics::track_event,
        analytics::dashboard_stats,
        auth::login,
        admin_products::list_products,
        admin_products::get_product,
        admin_products::create_product,
        admin_products::update_product,
        admin_products::delete_product,
        admin_products::upload_image,
    ),
    components(schemas(
        products::ProductResponse,
        products::VariantDto,
        checkout::CheckoutRequest,
        checkout::VariantChoice,
        checkout::CheckoutResponse,
        analytics::TrackRequest,
        analytics::StatsResponse,
        analytics::TopProductDto,
        analytics::FunnelMetricsDto,
        analytics::TrafficSourceDto,
        auth::LoginRequest,
        auth::LoginResponse,
        admin_products::CreateProductRequest,
        admin_products::UpdateProductRequest,
        admin_products::UploadResponse,
    )),
    tags(
        (name = "catalog", description = "Public product catalog"),
        (name = "checkout", description = "Payment sessions and provider callbacks"),
        (name = "analytics", description = "Funnel tracking and dashboard"),
        (name = "admin", description = "Authenticated catalog management"),
    )
)]
pub struct ApiDoc;

/// Malformed JSON bodies are validation errors with the usual `{"error": ...}` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

/// Unparseable path segments (e.g. a malformed id) cannot name an existing resource.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| AppError::NotFound(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .route("/health", web::get().to(health))
        .service(
            web::scope("/products")
                .route("", web::get().to(products::list_products))
                .route("/{id_or_slug}", web::get().to(products::get_product)),
        )
        .route("/checkout", web::post().to(checkout::create_checkout))
        .route("/webhook/stripe", web::post().to(webhook::stripe_webhook))
        .route("/analytics/track", web::post().to(analytics::track_event))
        .service(
            web::scope("/admin")
                .route("/auth/login", web::post().to(auth::login))
                .route("/analytics", web::get().to(analytics::dashboard_stats))
                .service(
                    web::scope("/products")
                        .route("", web::get().to(admin_products::list_products))
                        .route("", web::post().to(admin_products::create_product))
                        .route("/upload", web::post().to(admin_products::upload_image))
                        .route("/{id}", web::get().to(admin_products::get_product))
                        .route("/{id}", web::put().to(admin_products::update_product))
                        .route("/{id}", web::delete().to(admin_products::delete_product)),
                ),
        );
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "catalog"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
