use crate::dtos::BookingDTO;
use chrono::NaiveDate;
use practice_booking_domain::{Booking, BookingStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: BookingDTO,
}

impl BookingResponse {
    pub fn new(booking: Booking) -> Self {
        Self {
            booking: BookingDTO::new(booking),
        }
    }
}

/// Response of the operations that notify the client by email. A failed
/// email never fails the operation itself.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedBookingResponse {
    pub booking: BookingDTO,
    pub email_sent: bool,
}

impl NotifiedBookingResponse {
    pub fn new(booking: Booking, email_sent: bool) -> Self {
        Self {
            booking: BookingDTO::new(booking),
            email_sent,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingPathParams {
    pub booking_id: ID,
}

pub mod create_booking {
    use super::*;

    /// Every field is optional on the wire so that missing values are
    /// reported as validation errors naming the field
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub service: Option<String>,
        /// `YYYY-MM-DD`
        #[serde(default)]
        pub date: Option<String>,
        /// `HH:MM`
        #[serde(default)]
        pub time: Option<String>,
        /// Human readable, e.g. `1 hour` or `50 minutes`. Defaults to the
        /// duration of the service.
        #[serde(default)]
        pub duration: Option<String>,
        #[serde(default)]
        pub phone: Option<String>,
        #[serde(default)]
        pub notes: Option<String>,
    }

    pub type APIResponse = NotifiedBookingResponse;
}

pub mod get_booking {
    use super::*;

    pub type PathParams = BookingPathParams;

    pub type APIResponse = BookingResponse;
}

pub mod get_bookings {
    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        /// Comma separated list of statuses
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default)]
        pub from: Option<NaiveDate>,
        #[serde(default)]
        pub to: Option<NaiveDate>,
        /// Only honored for admins
        #[serde(default)]
        pub user_id: Option<ID>,
        #[serde(default)]
        pub descending: Option<bool>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub bookings: Vec<BookingDTO>,
    }

    impl APIResponse {
        pub fn new(bookings: Vec<Booking>) -> Self {
            Self {
                bookings: bookings.into_iter().map(BookingDTO::new).collect(),
            }
        }
    }
}

pub mod update_booking_status {
    use super::*;

    pub type PathParams = BookingPathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub status: BookingStatus,
    }

    pub type APIResponse = NotifiedBookingResponse;
}

pub mod send_urgent_message {
    use super::*;

    pub type PathParams = BookingPathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub message: String,
    }

    pub type APIResponse = NotifiedBookingResponse;
}

pub mod delete_booking {
    use super::*;

    pub type PathParams = BookingPathParams;

    pub type APIResponse = BookingResponse;
}
