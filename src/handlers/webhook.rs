use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /webhook/stripe
///
/// Takes the body as raw bytes; the signature covers them verbatim.
#[utoipa::path(
    post,
    path = "/webhook/stripe",
    request_body(content = String, content_type = "application/json", description = "Raw signed event"),
    params(
        ("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac>"),
    ),
    responses(
        (status = 200, description = "Event received"),
        (status = 400, description = "Missing or invalid signature"),
    ),
    tag = "checkout"
)]
pub async fn stripe_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Validation("Webhook Error: missing Stripe-Signature header".to_string()))?;

    state.orders.handle_webhook(&body, signature).await?;
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
