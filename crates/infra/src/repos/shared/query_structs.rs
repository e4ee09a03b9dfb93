use chrono::NaiveDate;
use practice_booking_domain::{BookingStatus, ID};

/// Filter for querying `Booking`s. Empty fields do not restrict the result.
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    pub statuses: Option<Vec<BookingStatus>>,
    /// Inclusive
    pub date_from: Option<NaiveDate>,
    /// Inclusive
    pub date_to: Option<NaiveDate>,
    pub user_id: Option<ID>,
    /// Results are ordered by date and time ascending unless this is set
    pub descending: bool,
}

impl BookingQuery {
    pub fn active_from(date_from: NaiveDate) -> Self {
        Self {
            statuses: Some(vec![BookingStatus::Pending, BookingStatus::Confirmed]),
            date_from: Some(date_from),
            ..Default::default()
        }
    }
}
