use crate::{APIResponse, BaseClient};
use chrono::NaiveDate;
use practice_booking_api_structs::*;
use practice_booking_domain::{BookingStatus, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct BookingClient {
    base: Arc<BaseClient>,
}

pub type CreateBookingInput = create_booking::RequestBody;

#[derive(Debug, Default)]
pub struct GetBookingsInput {
    pub statuses: Vec<BookingStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub user_id: Option<ID>,
    pub descending: bool,
}

impl GetBookingsInput {
    fn to_query_string(&self) -> String {
        let mut params = Vec::new();
        if !self.statuses.is_empty() {
            let statuses = self
                .statuses
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");
            params.push(format!("status={}", statuses));
        }
        if let Some(from) = self.from {
            params.push(format!("from={}", from));
        }
        if let Some(to) = self.to {
            params.push(format!("to={}", to));
        }
        if let Some(user_id) = &self.user_id {
            params.push(format!("userId={}", user_id));
        }
        if self.descending {
            params.push("descending=true".into());
        }
        params.join("&")
    }
}

impl BookingClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(
        &self,
        input: CreateBookingInput,
    ) -> APIResponse<create_booking::APIResponse> {
        self.base
            .post(input, "booking".into(), StatusCode::CREATED)
            .await
    }

    pub async fn get(&self, booking_id: &ID) -> APIResponse<get_booking::APIResponse> {
        self.base
            .get(format!("booking/{}", booking_id), StatusCode::OK)
            .await
    }

    pub async fn list(&self, input: GetBookingsInput) -> APIResponse<get_bookings::APIResponse> {
        self.base
            .get(
                format!("booking?{}", input.to_query_string()),
                StatusCode::OK,
            )
            .await
    }

    pub async fn update_status(
        &self,
        booking_id: &ID,
        status: BookingStatus,
    ) -> APIResponse<update_booking_status::APIResponse> {
        let body = update_booking_status::RequestBody { status };
        self.base
            .put(body, format!("booking/{}/status", booking_id), StatusCode::OK)
            .await
    }

    pub async fn send_urgent_message(
        &self,
        booking_id: &ID,
        message: String,
    ) -> APIResponse<send_urgent_message::APIResponse> {
        let body = send_urgent_message::RequestBody { message };
        self.base
            .post(
                body,
                format!("booking/{}/urgent-message", booking_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(&self, booking_id: &ID) -> APIResponse<delete_booking::APIResponse> {
        self.base
            .delete(format!("booking/{}", booking_id), StatusCode::OK)
            .await
    }
}
