use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::analytics::{parse_bound, AnalyticsFilter, DashboardStats};
use crate::errors::AppError;
use crate::handlers::auth::AdminAuth;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    /// One of `page_view`, `view_product`, `initiate_checkout`
    pub event_type: String,
    pub product_id: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// RFC 3339 timestamp or YYYY-MM-DD
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD (whole day)
    pub end_date: Option<String>,
    pub product_id: Option<String>,
}

impl StatsQuery {
    fn into_filter(self) -> Result<AnalyticsFilter, AppError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let start = present(self.start_date)
            .map(|raw| parse_bound(raw.trim(), false))
            .transpose()?;
        let end = present(self.end_date)
            .map(|raw| parse_bound(raw.trim(), true))
            .transpose()?;
        let product_id = present(self.product_id)
            .map(|raw| {
                Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation(format!("Invalid productId: {raw}")))
            })
            .transpose()?;
        Ok(AnalyticsFilter {
            start,
            end,
            product_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProductDto {
    pub product_name: String,
    pub sales_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FunnelMetricsDto {
    pub page_views: i64,
    pub checkouts_initiated: i64,
    pub purchases_completed: i64,
    /// Percentage with two decimals
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrafficSourceDto {
    pub source: String,
    pub visits: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Major currency units
    pub total_revenue: f64,
    pub total_orders: i64,
    pub top_products: Vec<TopProductDto>,
    pub funnel_metrics: FunnelMetricsDto,
    pub traffic_sources: Vec<TrafficSourceDto>,
}

impl From<DashboardStats> for StatsResponse {
    fn from(s: DashboardStats) -> Self {
        StatsResponse {
            total_revenue: s.total_revenue,
            total_orders: s.total_orders,
            top_products: s
                .top_products
                .into_iter()
                .map(|p| TopProductDto {
                    product_name: p.product_name,
                    sales_count: p.sales_count,
                })
                .collect(),
            funnel_metrics: FunnelMetricsDto {
                page_views: s.funnel_metrics.page_views,
                checkouts_initiated: s.funnel_metrics.checkouts_initiated,
                purchases_completed: s.funnel_metrics.purchases_completed,
                conversion_rate: s.funnel_metrics.conversion_rate,
            },
            traffic_sources: s
                .traffic_sources
                .into_iter()
                .map(|t| TrafficSourceDto {
                    source: t.source,
                    visits: t.visits,
                })
                .collect(),
        }
    }
}

/// POST /analytics/track
#[utoipa::path(
    post,
    path = "/analytics/track",
    request_body = TrackRequest,
    responses(
        (status = 200, description = "Event accepted"),
        (status = 400, description = "Unknown event type"),
    ),
    tag = "analytics"
)]
pub async fn track_event(
    state: web::Data<AppState>,
    body: web::Json<TrackRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    state
        .analytics
        .track(&body.event_type, body.product_id, body.source)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Event tracked" })))
}

/// GET /admin/analytics
#[utoipa::path(
    get,
    path = "/admin/analytics",
    params(StatsQuery),
    responses(
        (status = 200, description = "Dashboard statistics", body = StatsResponse),
        (status = 400, description = "Malformed filter"),
        (status = 401, description = "Missing or invalid admin credentials"),
    ),
    tag = "admin"
)]
pub async fn dashboard_stats(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    let stats = state.analytics.dashboard_stats(filter).await?;
    Ok(HttpResponse::Ok().json(StatsResponse::from(stats)))
}
