use std::sync::Arc;

use crate::domain::analytics::{
    conversion_rate, minor_to_major, AnalyticsFilter, DashboardStats, FunnelMetrics, TopProduct,
    RANKING_LIMIT,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{OrderRepository, ProductRepository, TrackingRepository};
use crate::domain::tracking::{EventType, NewTrackingEvent};

use super::blocking;

pub struct AnalyticsService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    tracking: Arc<dyn TrackingRepository>,
}

impl AnalyticsService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        tracking: Arc<dyn TrackingRepository>,
    ) -> Self {
        Self {
            products,
            orders,
            tracking,
        }
    }

    /// Records a funnel event. Storage failures are logged and swallowed.
    pub async fn track(
        &self,
        event_type: &str,
        product_id: Option<String>,
        source: Option<String>,
    ) -> Result<(), DomainError> {
        let event_type =
            EventType::parse(event_type).ok_or_else(|| DomainError::validation("Invalid eventType"))?;

        let repo = self.tracking.clone();
        let event = NewTrackingEvent {
            event_type,
            product_id: product_id.filter(|p| !p.is_empty()),
            source: source.filter(|s| !s.is_empty()),
        };
        if let Err(e) = blocking(move || repo.record(event)).await {
            log::error!("Failed to track {} event: {e}", event_type.as_str());
        }
        Ok(())
    }

    pub async fn dashboard_stats(&self, filter: AnalyticsFilter) -> Result<DashboardStats, DomainError> {
        let orders = self.orders.clone();
        let tracking = self.tracking.clone();
        let products = self.products.clone();

        blocking(move || {
            let paid = orders.paid_summary(&filter)?;

            let top_products = if filter.product_id.is_some() {
                Vec::new()
            } else {
                let ranked = orders.top_products(&filter, RANKING_LIMIT)?;
                let ids: Vec<_> = ranked.iter().map(|(id, _)| *id).collect();
                let names = products.find_names(&ids)?;
                // Products deleted since the sale drop out of the ranking.
                ranked
                    .into_iter()
                    .filter_map(|(id, sales_count)| {
                        names.get(&id).map(|name| TopProduct {
                            product_name: name.clone(),
                            sales_count,
                        })
                    })
                    .collect()
            };

            let page_views = tracking.count(&filter, EventType::PageView)?;
            let product_views = tracking.count(&filter, EventType::ViewProduct)?;
            let checkouts_initiated = tracking.count(&filter, EventType::InitiateCheckout)?;
            let views = if filter.product_id.is_some() {
                product_views
            } else {
                page_views
            };

            Ok(DashboardStats {
                total_revenue: minor_to_major(paid.revenue),
                total_orders: paid.count,
                top_products,
                funnel_metrics: FunnelMetrics {
                    page_views: views,
                    checkouts_initiated,
                    purchases_completed: paid.count,
                    conversion_rate: conversion_rate(paid.count, views),
                },
                traffic_sources: tracking.top_sources(&filter, RANKING_LIMIT)?,
            })
        })
        .await
    }
}
