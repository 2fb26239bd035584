use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ChosenVariant, NewOrder};
use crate::domain::payment::{CheckoutSession, CheckoutSessionRequest};
use crate::domain::ports::{OrderRepository, PaymentGateway, ProductRepository};

use super::blocking;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub variant: Option<ChosenVariant>,
}

pub struct CheckoutService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentGateway>,
    frontend_url: String,
}

impl CheckoutService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentGateway>,
        frontend_url: String,
    ) -> Self {
        Self {
            products,
            orders,
            payments,
            frontend_url,
        }
    }

    fn return_url(&self) -> String {
        format!(
            "{}/return?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url.trim_end_matches('/')
        )
    }

    /// Opens a payment session and records the matching pending order.
    ///
    /// The order is stored before the client secret is handed out.
    pub async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, DomainError> {
        if request.quantity < 1 {
            return Err(DomainError::validation("Quantity must be at least 1"));
        }
        let variant = request
            .variant
            .map(ChosenVariant::normalize)
            .transpose()?
            .filter(|v| !v.is_empty());

        let repo = self.products.clone();
        let product_id = request.product_id;
        let product = blocking(move || repo.find_by_id(product_id))
            .await?
            .ok_or_else(|| DomainError::NotFound("Product not found".to_string()))?;

        let unit_amount = product.unit_amount()?;
        let amount_total = unit_amount
            .checked_mul(i64::from(request.quantity))
            .ok_or_else(|| DomainError::validation("Order total is out of range"))?;

        let description = variant
            .as_ref()
            .map(ChosenVariant::label)
            .filter(|label| !label.is_empty())
            .map(|label| format!("Variant: {label}"));

        let session = self
            .payments
            .create_checkout_session(CheckoutSessionRequest {
                product_id: product.id,
                product_name: product.name.clone(),
                description,
                images: product.images.clone(),
                variant: variant.clone(),
                unit_amount,
                quantity: request.quantity,
                return_url: self.return_url(),
            })
            .await
            .map_err(|e| {
                log::error!("Payment session creation failed for product {}: {e}", product.id);
                DomainError::upstream("Failed to create checkout session")
            })?;

        let repo = self.orders.clone();
        let order = NewOrder {
            product_id: product.id,
            quantity: request.quantity,
            variant,
            payment_session_id: session.id.clone(),
            amount_total,
        };
        let order = blocking(move || repo.create(order)).await.map_err(|e| {
            log::error!("Failed to record order for session {}: {e}", session.id);
            e
        })?;

        log::info!(
            "Created checkout session {} for order {} ({} minor units)",
            session.id,
            order.id,
            order.amount_total
        );
        Ok(session)
    }
}
