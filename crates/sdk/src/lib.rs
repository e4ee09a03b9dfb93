mod base;
mod booking;
mod job;
mod status;
mod user;

use booking::BookingClient;
use job::JobClient;
use status::StatusClient;
use std::sync::Arc;
use user::UserClient;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};

pub use booking::{CreateBookingInput, GetBookingsInput};
pub use practice_booking_api_structs::dtos::{BookingDTO, UserDTO};
pub use practice_booking_domain::{BookingStatus, ServiceType, ID};

/// Practice Booking Server SDK
///
/// The SDK contains methods for interacting with the practice booking
/// server API.
#[derive(Clone)]
pub struct PracticeSDK {
    pub booking: BookingClient,
    pub job: JobClient,
    pub status: StatusClient,
    pub user: UserClient,
}

impl PracticeSDK {
    /// Client acting as the user behind the session token
    pub fn new<T: Into<String>>(address: String, session_token: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_session_token(session_token.into());
        Self::from_base(base)
    }

    /// Client for the job routes
    pub fn for_jobs<T: Into<String>>(address: String, job_secret: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_job_secret(job_secret.into());
        Self::from_base(base)
    }

    fn from_base(base: BaseClient) -> Self {
        let base = Arc::new(base);

        Self {
            booking: BookingClient::new(base.clone()),
            job: JobClient::new(base.clone()),
            status: StatusClient::new(base.clone()),
            user: UserClient::new(base),
        }
    }
}
