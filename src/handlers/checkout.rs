use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout_service;
use crate::domain::order::ChosenVariant;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VariantChoice {
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub variant: Option<VariantChoice>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Secret for the embedded payment form
    pub client_secret: String,
    /// Payment session id
    pub id: String,
}

/// POST /checkout
///
/// Opens an embedded payment session and records a pending order for it.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Payment session created", body = CheckoutResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Payment provider failure"),
    ),
    tag = "checkout"
)]
pub async fn create_checkout(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let session = state
        .checkout
        .create_session(checkout_service::CheckoutRequest {
            product_id: body.product_id,
            quantity: body.quantity,
            variant: body.variant.map(|v| ChosenVariant {
                size: v.size,
                color: v.color,
            }),
        })
        .await?;

    Ok(HttpResponse::Ok().json(CheckoutResponse {
        client_secret: session.client_secret,
        id: session.id,
    }))
}
