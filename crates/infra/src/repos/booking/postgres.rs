use super::{IBookingRepo, InsertBookingError};
use crate::repos::shared::{query_structs::BookingQuery, repo::DeleteResult};
use chrono::{NaiveDate, NaiveTime};
use futures::stream::{BoxStream, StreamExt};
use practice_booking_domain::{
    Booking, BookingSource, BookingStatus, ReminderMarkers, ReminderWindow, ServiceType,
    UrgentMessage, ID,
};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use std::convert::TryFrom;
use tracing::error;

const EXTERNAL_ID_CONSTRAINT: &str = "bookings_external_id_key";

fn is_external_id_conflict(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    db_err.is_unique_violation() && db_err.constraint() == Some(EXTERNAL_ID_CONSTRAINT)
}

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRaw {
    booking_uid: Uuid,
    external_id: Option<String>,
    user_uid: Option<Uuid>,
    user_name: String,
    user_email: String,
    user_phone: Option<String>,
    service: String,
    appointment_date: NaiveDate,
    appointment_time: NaiveTime,
    duration: String,
    duration_minutes: i64,
    notes: Option<String>,
    meeting_link: Option<String>,
    status: String,
    created: i64,
    updated: i64,
    week_before_sent_at: Option<i64>,
    day_before_sent_at: Option<i64>,
    two_hours_sent_at: Option<i64>,
    urgent_messages: Json<Vec<UrgentMessage>>,
    source: String,
    last_synced: Option<i64>,
}

impl TryFrom<BookingRaw> for Booking {
    type Error = anyhow::Error;

    fn try_from(raw: BookingRaw) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.booking_uid.into(),
            external_id: raw.external_id,
            user_id: raw.user_uid.map(ID::from),
            user_name: raw.user_name,
            user_email: raw.user_email,
            user_phone: raw.user_phone,
            service: raw.service.parse::<ServiceType>()?,
            date: raw.appointment_date,
            time: raw.appointment_time,
            duration: raw.duration,
            duration_minutes: raw.duration_minutes,
            notes: raw.notes,
            meeting_link: raw.meeting_link,
            status: raw.status.parse::<BookingStatus>()?,
            created: raw.created,
            updated: raw.updated,
            reminders: ReminderMarkers {
                week_before: raw.week_before_sent_at,
                day_before: raw.day_before_sent_at,
                two_hours: raw.two_hours_sent_at,
            },
            urgent_messages: raw.urgent_messages.0,
            source: BookingSource::from_db(&raw.source),
            last_synced: raw.last_synced,
        })
    }
}

const STREAM_ASC: &str = r#"
    SELECT * FROM bookings
    WHERE ($1::text[] IS NULL OR status = ANY($1))
    AND ($2::date IS NULL OR appointment_date >= $2)
    AND ($3::date IS NULL OR appointment_date <= $3)
    AND ($4::uuid IS NULL OR user_uid = $4)
    ORDER BY appointment_date ASC, appointment_time ASC
    "#;

const STREAM_DESC: &str = r#"
    SELECT * FROM bookings
    WHERE ($1::text[] IS NULL OR status = ANY($1))
    AND ($2::date IS NULL OR appointment_date >= $2)
    AND ($3::date IS NULL OR appointment_date <= $3)
    AND ($4::uuid IS NULL OR user_uid = $4)
    ORDER BY appointment_date DESC, appointment_time DESC
    "#;

fn marker_update_sql(window: ReminderWindow) -> &'static str {
    match window {
        ReminderWindow::WeekBefore => {
            r#"
            UPDATE bookings
            SET week_before_sent = TRUE, week_before_sent_at = $2
            WHERE booking_uid = $1 AND week_before_sent = FALSE
            "#
        }
        ReminderWindow::DayBefore => {
            r#"
            UPDATE bookings
            SET day_before_sent = TRUE, day_before_sent_at = $2
            WHERE booking_uid = $1 AND day_before_sent = FALSE
            "#
        }
        ReminderWindow::TwoHours => {
            r#"
            UPDATE bookings
            SET two_hours_sent = TRUE, two_hours_sent_at = $2
            WHERE booking_uid = $1 AND two_hours_sent = FALSE
            "#
        }
    }
}

fn to_domain(raw: Result<BookingRaw, sqlx::Error>) -> anyhow::Result<Booking> {
    Booking::try_from(raw?)
}

#[async_trait::async_trait]
impl IBookingRepo for PostgresBookingRepo {
    async fn insert(&self, booking: &Booking) -> Result<(), InsertBookingError> {
        let res = sqlx::query(
            r#"
            INSERT INTO bookings(
                booking_uid, external_id, user_uid, user_name, user_email, user_phone,
                service, appointment_date, appointment_time, duration, duration_minutes,
                notes, meeting_link, status, created, updated,
                week_before_sent, week_before_sent_at,
                day_before_sent, day_before_sent_at,
                two_hours_sent, two_hours_sent_at,
                urgent_messages, source, last_synced
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25)
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(&booking.external_id)
        .bind(booking.user_id.as_ref().map(|id| *id.inner_ref()))
        .bind(&booking.user_name)
        .bind(&booking.user_email)
        .bind(&booking.user_phone)
        .bind(booking.service.name())
        .bind(booking.date)
        .bind(booking.time)
        .bind(&booking.duration)
        .bind(booking.duration_minutes)
        .bind(&booking.notes)
        .bind(&booking.meeting_link)
        .bind(booking.status.as_str())
        .bind(booking.created)
        .bind(booking.updated)
        .bind(booking.reminders.week_before.is_some())
        .bind(booking.reminders.week_before)
        .bind(booking.reminders.day_before.is_some())
        .bind(booking.reminders.day_before)
        .bind(booking.reminders.two_hours.is_some())
        .bind(booking.reminders.two_hours)
        .bind(Json(&booking.urgent_messages))
        .bind(booking.source.as_str())
        .bind(booking.last_synced)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if is_external_id_conflict(db_err.as_ref()) => {
                Err(InsertBookingError::DuplicateExternalId(
                    booking.external_id.clone().unwrap_or_default(),
                ))
            }
            Err(e) => {
                error!("Unable to insert booking: {:?}", e);
                Err(InsertBookingError::Storage(e.into()))
            }
        }
    }

    async fn find(&self, booking_id: &ID) -> Option<Booking> {
        let res = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;
        match res {
            Ok(raw) => raw.and_then(|raw| to_domain(Ok(raw)).ok()),
            Err(e) => {
                error!("Unable to find booking {}: {:?}", booking_id, e);
                None
            }
        }
    }

    async fn find_by_external_id(&self, external_id: &str) -> Option<Booking> {
        let res = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await;
        match res {
            Ok(raw) => raw.and_then(|raw| to_domain(Ok(raw)).ok()),
            Err(e) => {
                error!("Unable to find booking by external id {}: {:?}", external_id, e);
                None
            }
        }
    }

    fn stream(&self, query: BookingQuery) -> BoxStream<'_, anyhow::Result<Booking>> {
        let sql = if query.descending {
            STREAM_DESC
        } else {
            STREAM_ASC
        };
        let statuses = query.statuses.map(|statuses| {
            statuses
                .iter()
                .map(|s| s.as_str().to_string())
                .collect::<Vec<_>>()
        });
        sqlx::query_as::<_, BookingRaw>(sql)
            .bind(statuses)
            .bind(query.date_from)
            .bind(query.date_to)
            .bind(query.user_id.map(|id| id.inner()))
            .fetch(&self.pool)
            .map(to_domain)
            .boxed()
    }

    async fn update_status(
        &self,
        booking_id: &ID,
        expected: BookingStatus,
        new: BookingStatus,
        updated: i64,
    ) -> anyhow::Result<bool> {
        let rows = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $3, updated = $4
            WHERE booking_uid = $1 AND status = $2
            "#,
        )
        .bind(booking_id.inner_ref())
        .bind(expected.as_str())
        .bind(new.as_str())
        .bind(updated)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows == 1)
    }

    async fn set_reminder_marker(
        &self,
        booking_id: &ID,
        window: ReminderWindow,
        at: i64,
    ) -> anyhow::Result<bool> {
        let rows = sqlx::query(marker_update_sql(window))
            .bind(booking_id.inner_ref())
            .bind(at)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows == 1)
    }

    async fn append_urgent_message(
        &self,
        booking_id: &ID,
        message: &UrgentMessage,
        updated: i64,
    ) -> anyhow::Result<bool> {
        let rows = sqlx::query(
            r#"
            UPDATE bookings
            SET urgent_messages = urgent_messages || $2::jsonb, updated = $3
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .bind(Json(vec![message]))
        .bind(updated)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows == 1)
    }

    async fn save_synced_fields(&self, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET external_id = $2,
            user_name = $3,
            user_email = $4,
            user_phone = $5,
            service = $6,
            appointment_date = $7,
            appointment_time = $8,
            duration = $9,
            duration_minutes = $10,
            notes = $11,
            meeting_link = $12,
            status = $13,
            updated = $14,
            last_synced = $15
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(&booking.external_id)
        .bind(&booking.user_name)
        .bind(&booking.user_email)
        .bind(&booking.user_phone)
        .bind(booking.service.name())
        .bind(booking.date)
        .bind(booking.time)
        .bind(&booking.duration)
        .bind(booking.duration_minutes)
        .bind(&booking.notes)
        .bind(&booking.meeting_link)
        .bind(booking.status.as_str())
        .bind(booking.updated)
        .bind(booking.last_synced)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to save synced booking {}: {:?}", booking.id, e);
            e
        })?;
        Ok(())
    }

    async fn delete(&self, booking_id: &ID) -> Option<Booking> {
        let res = sqlx::query_as::<_, BookingRaw>(
            r#"
            DELETE FROM bookings
            WHERE booking_uid = $1
            RETURNING *
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;
        match res {
            Ok(raw) => raw.and_then(|raw| to_domain(Ok(raw)).ok()),
            Err(e) => {
                error!("Unable to delete booking {}: {:?}", booking_id, e);
                None
            }
        }
    }

    async fn delete_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult> {
        let deleted_count = sqlx::query(
            r#"
            DELETE FROM bookings
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(DeleteResult { deleted_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct UniqueViolation(Option<&'static str>);

    impl fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl StdError for UniqueViolation {}

    impl DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.0
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn only_the_external_id_constraint_is_a_duplicate_external_id() {
        assert!(is_external_id_conflict(&UniqueViolation(Some(
            "bookings_external_id_key"
        ))));
        assert!(!is_external_id_conflict(&UniqueViolation(Some(
            "bookings_pkey"
        ))));
        assert!(!is_external_id_conflict(&UniqueViolation(None)));
    }
}
