use crate::{APIResponse, BaseClient};
use practice_booking_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

/// Triggers the periodic passes, authenticated by the job secret
#[derive(Clone)]
pub struct JobClient {
    base: Arc<BaseClient>,
}

impl JobClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn sync_bookings(&self) -> APIResponse<sync_external_bookings::APIResponse> {
        self.base
            .post((), "jobs/sync-bookings".into(), StatusCode::OK)
            .await
    }

    pub async fn send_reminders(&self) -> APIResponse<send_due_reminders::APIResponse> {
        self.base
            .post((), "jobs/send-reminders".into(), StatusCode::OK)
            .await
    }
}
