use std::sync::Arc;

use bigdecimal::RoundingMode;

use crate::domain::errors::DomainError;
use crate::domain::fulfillment::{FulfillmentItem, FulfillmentOrder, FulfillmentOrderRequest, Recipient};
use crate::domain::order::{Order, PaymentConfirmation};
use crate::domain::payment::{CompletedSession, PaymentEvent, ShippingDetails};
use crate::domain::ports::{FulfillmentProvider, OrderRepository, PaymentGateway, ProductRepository};

use super::blocking;

/// What a verified payment notification did to the order store.
#[derive(Debug)]
pub enum WebhookOutcome {
    Paid(Order),
    /// The session's order was already paid; the notification was a redelivery.
    AlreadyPaid,
    UnknownSession(String),
    Ignored(String),
}

pub struct OrderService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentGateway>,
    fulfillment: Arc<dyn FulfillmentProvider>,
}

impl OrderService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentGateway>,
        fulfillment: Arc<dyn FulfillmentProvider>,
    ) -> Self {
        Self {
            products,
            orders,
            payments,
            fulfillment,
        }
    }

    /// Verifies and applies a payment-provider notification.
    ///
    /// An invalid signature is a `Validation` error and leaves every order untouched.
    /// Fulfillment failures after payment are logged and never undo the paid status.
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome, DomainError> {
        let event = self.payments.verify_event(payload, signature).map_err(|e| {
            log::warn!("Rejected payment webhook: {e}");
            e
        })?;

        match event {
            PaymentEvent::Other(event_type) => {
                log::info!("Ignoring payment event {event_type}");
                Ok(WebhookOutcome::Ignored(event_type))
            }
            PaymentEvent::CheckoutSessionCompleted(CompletedSession { confirmation, shipping }) => {
                let outcome = self.confirm_payment(confirmation).await?;
                if let WebhookOutcome::Paid(order) = &outcome {
                    match shipping {
                        Some(shipping) => {
                            if let Err(e) = self.dispatch_fulfillment(order, &shipping).await {
                                log::error!("Fulfillment dispatch failed for order {}: {e}", order.id);
                            }
                        }
                        None => log::warn!("Order {} has no shipping address; not fulfilled", order.id),
                    }
                }
                Ok(outcome)
            }
        }
    }

    pub async fn confirm_payment(&self, confirmation: PaymentConfirmation) -> Result<WebhookOutcome, DomainError> {
        let session_id = confirmation.payment_session_id.clone();
        let repo = self.orders.clone();
        let paid = blocking(move || repo.mark_paid(&confirmation)).await?;
        if let Some(order) = paid {
            log::info!("Order {} paid (session {session_id})", order.id);
            return Ok(WebhookOutcome::Paid(order));
        }

        let repo = self.orders.clone();
        let lookup = session_id.clone();
        match blocking(move || repo.find_by_session_id(&lookup)).await? {
            Some(order) => {
                log::info!("Duplicate completion for session {session_id} (order {} is {})", order.id, order.status.as_str());
                Ok(WebhookOutcome::AlreadyPaid)
            }
            None => {
                log::warn!("Payment completed for unknown session {session_id}");
                Ok(WebhookOutcome::UnknownSession(session_id))
            }
        }
    }

    /// Sends a paid order to the fulfillment provider.
    ///
    /// Returns `Ok(None)` when the ordered variant has no fulfillment mapping.
    pub async fn dispatch_fulfillment(
        &self,
        order: &Order,
        shipping: &ShippingDetails,
    ) -> Result<Option<FulfillmentOrder>, DomainError> {
        let repo = self.products.clone();
        let product_id = order.product_id;
        let Some(product) = blocking(move || repo.find_by_id(product_id)).await? else {
            log::warn!("Product {product_id} of order {} no longer exists; skipping fulfillment", order.id);
            return Ok(None);
        };

        let chosen = order.variant.clone().unwrap_or_default();
        let sync_variant_id = product
            .find_variant(chosen.size.as_deref(), chosen.color.as_deref())
            .and_then(|v| v.fulfillment_variant_id);
        let Some(sync_variant_id) = sync_variant_id else {
            log::warn!(
                "No fulfillment mapping for order {} ({} [{}]); manual handling required",
                order.id,
                product.name,
                chosen.label()
            );
            return Ok(None);
        };

        let customer = order.customer.clone().unwrap_or_default();
        let address = &shipping.address;
        let request = FulfillmentOrderRequest {
            external_id: order.id.simple().to_string(),
            recipient: Recipient {
                name: shipping.name.clone().or(customer.name).unwrap_or_default(),
                address1: address.line1.clone(),
                address2: address.line2.clone(),
                city: address.city.clone(),
                state_code: address.state.clone(),
                country_code: address.country.clone(),
                zip: address.postal_code.clone(),
                email: customer.email,
            },
            items: vec![FulfillmentItem {
                sync_variant_id,
                quantity: order.quantity,
                retail_price: product
                    .price
                    .with_scale_round(2, RoundingMode::HalfUp)
                    .to_string(),
            }],
        };

        let created = self.fulfillment.create_order(request).await?;
        log::info!("Fulfillment order {} created for order {}", created.id, order.id);
        Ok(Some(created))
    }
}
