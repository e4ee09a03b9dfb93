use super::{IBookingRepo, InsertBookingError};
use crate::repos::shared::{inmemory_repo::*, query_structs::BookingQuery, repo::DeleteResult};
use futures::stream::{self, BoxStream, StreamExt};
use practice_booking_domain::{Booking, BookingStatus, ReminderWindow, UrgentMessage, ID};
use std::sync::Mutex;

pub struct InMemoryBookingRepo {
    bookings: Mutex<Vec<Booking>>,
}

impl InMemoryBookingRepo {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(Vec::new()),
        }
    }
}

fn matches_query(booking: &Booking, query: &BookingQuery) -> bool {
    if let Some(statuses) = &query.statuses {
        if !statuses.contains(&booking.status) {
            return false;
        }
    }
    if let Some(from) = query.date_from {
        if booking.date < from {
            return false;
        }
    }
    if let Some(to) = query.date_to {
        if booking.date > to {
            return false;
        }
    }
    match &query.user_id {
        Some(user_id) => booking.user_id.as_ref() == Some(user_id),
        None => true,
    }
}

#[async_trait::async_trait]
impl IBookingRepo for InMemoryBookingRepo {
    async fn insert(&self, booking: &Booking) -> Result<(), InsertBookingError> {
        // Check and insert under one lock, like a unique index would
        let mut bookings = self.bookings.lock().unwrap();
        if let Some(external_id) = &booking.external_id {
            if bookings
                .iter()
                .any(|b| b.external_id.as_ref() == Some(external_id))
            {
                return Err(InsertBookingError::DuplicateExternalId(
                    external_id.clone(),
                ));
            }
        }
        bookings.push(booking.clone());
        Ok(())
    }

    async fn find(&self, booking_id: &ID) -> Option<Booking> {
        find(booking_id, &self.bookings)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Option<Booking> {
        find_by(&self.bookings, |b| {
            b.external_id.as_deref() == Some(external_id)
        })
        .into_iter()
        .next()
    }

    fn stream(&self, query: BookingQuery) -> BoxStream<'_, anyhow::Result<Booking>> {
        let mut bookings = find_by(&self.bookings, |b| matches_query(b, &query));
        bookings.sort_by(|b1, b2| (b1.date, b1.time).cmp(&(b2.date, b2.time)));
        if query.descending {
            bookings.reverse();
        }
        stream::iter(bookings.into_iter().map(Ok)).boxed()
    }

    async fn update_status(
        &self,
        booking_id: &ID,
        expected: BookingStatus,
        new: BookingStatus,
        updated: i64,
    ) -> anyhow::Result<bool> {
        let applied = update_one(booking_id, &self.bookings, |booking| {
            if booking.status != expected {
                return false;
            }
            booking.status = new;
            booking.updated = updated;
            true
        });
        Ok(applied.unwrap_or(false))
    }

    async fn set_reminder_marker(
        &self,
        booking_id: &ID,
        window: ReminderWindow,
        at: i64,
    ) -> anyhow::Result<bool> {
        let flipped = update_one(booking_id, &self.bookings, |booking| {
            booking.reminders.mark(window, at)
        });
        Ok(flipped.unwrap_or(false))
    }

    async fn append_urgent_message(
        &self,
        booking_id: &ID,
        message: &UrgentMessage,
        updated: i64,
    ) -> anyhow::Result<bool> {
        let appended = update_one(booking_id, &self.bookings, |booking| {
            booking.urgent_messages.push(message.clone());
            booking.updated = updated;
        });
        Ok(appended.is_some())
    }

    async fn save_synced_fields(&self, synced: &Booking) -> anyhow::Result<()> {
        update_one(&synced.id, &self.bookings, |booking| {
            let reminders = booking.reminders.clone();
            let urgent_messages = std::mem::take(&mut booking.urgent_messages);
            let created = booking.created;
            let user_id = booking.user_id.clone();
            let source = booking.source;
            *booking = synced.clone();
            booking.reminders = reminders;
            booking.urgent_messages = urgent_messages;
            booking.created = created;
            booking.user_id = user_id;
            booking.source = source;
        });
        Ok(())
    }

    async fn delete(&self, booking_id: &ID) -> Option<Booking> {
        delete(booking_id, &self.bookings)
    }

    async fn delete_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.bookings, |b| b.user_id.as_ref() == Some(user_id)))
    }
}
