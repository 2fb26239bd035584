use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Number of entries in the top-products and traffic-source rankings.
pub const RANKING_LIMIT: i64 = 5;

#[derive(Debug, Clone, Default)]
pub struct AnalyticsFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub product_id: Option<Uuid>,
}

impl AnalyticsFilter {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= at) && self.end.map_or(true, |end| at <= end)
    }
}

/// Parses a filter bound given either as RFC 3339 or as a plain `YYYY-MM-DD`.
///
/// A plain end date covers the whole day.
pub fn parse_bound(raw: &str, is_end: bool) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("Invalid date: {raw}")))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DomainError::validation(format!("Invalid date: {raw}")))?
        .and_utc();
    if !is_end {
        return Ok(midnight);
    }
    midnight
        .checked_add_days(Days::new(1))
        .map(|next| next - chrono::Duration::nanoseconds(1))
        .ok_or_else(|| DomainError::validation(format!("Invalid date: {raw}")))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopProduct {
    pub product_name: String,
    pub sales_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSource {
    pub source: String,
    pub visits: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunnelMetrics {
    pub page_views: i64,
    pub checkouts_initiated: i64,
    pub purchases_completed: i64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// Major currency units.
    pub total_revenue: f64,
    pub total_orders: i64,
    pub top_products: Vec<TopProduct>,
    pub funnel_metrics: FunnelMetrics,
    pub traffic_sources: Vec<TrafficSource>,
}

/// Paid orders over views as a percentage, rounded to two decimals. Zero views yield zero.
pub fn conversion_rate(orders: i64, views: i64) -> f64 {
    if views <= 0 {
        return 0.0;
    }
    let pct = orders as f64 / views as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

pub fn minor_to_major(amount: i64) -> f64 {
    amount as f64 / 100.0
}
