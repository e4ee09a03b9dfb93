mod inmemory;
mod postgres;

use crate::repos::shared::{query_structs::BookingQuery, repo::DeleteResult};
use futures::stream::BoxStream;
pub use inmemory::InMemoryBookingRepo;
pub use postgres::PostgresBookingRepo;
use practice_booking_domain::{Booking, BookingStatus, ReminderWindow, UrgentMessage, ID};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsertBookingError {
    #[error("A booking with external id `{0}` already exists")]
    DuplicateExternalId(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait IBookingRepo: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), InsertBookingError>;
    async fn find(&self, booking_id: &ID) -> Option<Booking>;
    async fn find_by_external_id(&self, external_id: &str) -> Option<Booking>;
    /// Lazily streams the bookings matching the query ordered by date and time
    fn stream(&self, query: BookingQuery) -> BoxStream<'_, anyhow::Result<Booking>>;
    /// Sets the status to `new` only if it currently is `expected`.
    /// Returns whether the update was applied.
    async fn update_status(
        &self,
        booking_id: &ID,
        expected: BookingStatus,
        new: BookingStatus,
        updated: i64,
    ) -> anyhow::Result<bool>;
    /// Sets the marker for `window` only if it is not already set.
    /// Returns whether the marker flipped.
    async fn set_reminder_marker(
        &self,
        booking_id: &ID,
        window: ReminderWindow,
        at: i64,
    ) -> anyhow::Result<bool>;
    /// Returns `false` if the booking does not exist
    async fn append_urgent_message(
        &self,
        booking_id: &ID,
        message: &UrgentMessage,
        updated: i64,
    ) -> anyhow::Result<bool>;
    /// Writes the fields owned by the external scheduling service. Reminder
    /// markers and urgent messages are never written by this.
    async fn save_synced_fields(&self, booking: &Booking) -> anyhow::Result<()>;
    async fn delete(&self, booking_id: &ID) -> Option<Booking>;
    async fn delete_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult>;
}
