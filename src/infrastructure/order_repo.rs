use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::Utc;
use diesel::dsl::{count_star, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::analytics::AnalyticsFilter;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus, PaymentConfirmation};
use crate::domain::ports::{OrderRepository, PaidSummary};
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow, PaymentChangeset};

type OrderPredicate = Box<dyn BoxableExpression<orders::table, Pg, SqlType = Bool>>;

/// Paid orders inside the filter window, optionally narrowed to one product.
fn paid_in(filter: &AnalyticsFilter) -> OrderPredicate {
    let mut predicate: OrderPredicate = Box::new(orders::status.eq(OrderStatus::Paid.as_str()));
    if let Some(start) = filter.start {
        predicate = Box::new(predicate.and(orders::created_at.ge(start)));
    }
    if let Some(end) = filter.end {
        predicate = Box::new(predicate.and(orders::created_at.le(end)));
    }
    if let Some(product_id) = filter.product_id {
        predicate = Box::new(predicate.and(orders::product_id.eq(product_id)));
    }
    predicate
}

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        let (variant_size, variant_color) = order
            .variant
            .map(|v| (v.size, v.color))
            .unwrap_or_default();
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                product_id: order.product_id,
                quantity: order.quantity,
                variant_size,
                variant_color,
                payment_session_id: order.payment_session_id,
                status: OrderStatus::Pending.as_str().to_string(),
                amount_total: order.amount_total,
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;
        Order::try_from(row)
    }

    fn find_by_session_id(&self, session_id: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .filter(orders::payment_session_id.eq(session_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn mark_paid(&self, confirmation: &PaymentConfirmation) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let customer = confirmation.customer.clone();
        let changeset = PaymentChangeset {
            status: OrderStatus::Paid.as_str().to_string(),
            amount_total: confirmation.amount_total,
            customer_email: customer.as_ref().map(|c| c.email.clone()),
            customer_name: customer.map(|c| c.name),
            updated_at: Utc::now(),
        };
        let target = orders::table
            .filter(orders::payment_session_id.eq(&confirmation.payment_session_id))
            .filter(orders::status.eq(OrderStatus::Pending.as_str()));

        diesel::update(target)
            .set(&changeset)
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn paid_summary(&self, filter: &AnalyticsFilter) -> Result<PaidSummary, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let count: i64 = orders::table
                .filter(paid_in(filter))
                .count()
                .get_result(conn)?;
            let revenue: Option<BigDecimal> = orders::table
                .filter(paid_in(filter))
                .select(sum(orders::amount_total))
                .get_result(conn)?;
            let revenue = match revenue {
                Some(total) => total
                    .to_i64()
                    .ok_or_else(|| DomainError::Internal("Revenue overflow".to_string()))?,
                None => 0,
            };
            Ok(PaidSummary { count, revenue })
        })
    }

    fn top_products(&self, filter: &AnalyticsFilter, limit: i64) -> Result<Vec<(Uuid, i64)>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(paid_in(filter))
            .group_by(orders::product_id)
            .select((orders::product_id, count_star()))
            .order(count_star().desc())
            .limit(limit)
            .load::<(Uuid, i64)>(&mut conn)?;
        Ok(rows)
    }
}
