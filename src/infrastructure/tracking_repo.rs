use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::analytics::{AnalyticsFilter, TrafficSource};
use crate::domain::errors::DomainError;
use crate::domain::ports::TrackingRepository;
use crate::domain::tracking::{EventType, NewTrackingEvent, TrackingEvent};
use crate::schema::tracking_events;

use super::models::{NewTrackingEventRow, TrackingEventRow};

type EventPredicate = Box<dyn BoxableExpression<tracking_events::table, Pg, SqlType = Bool>>;

/// Narrows `predicate` to the filter window and product.
fn windowed(mut predicate: EventPredicate, filter: &AnalyticsFilter) -> EventPredicate {
    if let Some(start) = filter.start {
        predicate = Box::new(predicate.and(tracking_events::created_at.ge(start)));
    }
    if let Some(end) = filter.end {
        predicate = Box::new(predicate.and(tracking_events::created_at.le(end)));
    }
    if let Some(product_id) = filter.product_id {
        predicate = Box::new(predicate.and(
            tracking_events::product_id
                .assume_not_null()
                .eq(product_id.to_string()),
        ));
    }
    predicate
}

pub struct DieselTrackingRepository {
    pool: DbPool,
}

impl DieselTrackingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TrackingRepository for DieselTrackingRepository {
    fn record(&self, event: NewTrackingEvent) -> Result<TrackingEvent, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(tracking_events::table)
            .values(&NewTrackingEventRow {
                id: Uuid::new_v4(),
                event_type: event.event_type.as_str().to_string(),
                product_id: event.product_id,
                source: event.source,
            })
            .returning(TrackingEventRow::as_returning())
            .get_result(&mut conn)?;
        TrackingEvent::try_from(row)
    }

    fn count(&self, filter: &AnalyticsFilter, event_type: EventType) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        let count = tracking_events::table
            .filter(windowed(
                Box::new(tracking_events::event_type.eq(event_type.as_str())),
                filter,
            ))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    fn top_sources(&self, filter: &AnalyticsFilter, limit: i64) -> Result<Vec<TrafficSource>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = tracking_events::table
            .filter(windowed(
                Box::new(
                    tracking_events::source
                        .is_not_null()
                        .and(tracking_events::source.assume_not_null().ne("")),
                ),
                filter,
            ))
            .group_by(tracking_events::source)
            .select((tracking_events::source, count_star()))
            .order(count_star().desc())
            .limit(limit)
            .load::<(Option<String>, i64)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .filter_map(|(source, visits)| source.map(|source| TrafficSource { source, visits }))
            .collect())
    }
}
