use crate::{APIResponse, BaseClient};
use practice_booking_api_structs::*;
use practice_booking_domain::ID;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserClient {
    base: Arc<BaseClient>,
}

impl UserClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn me(&self) -> APIResponse<get_me::APIResponse> {
        self.base.get("me".into(), StatusCode::OK).await
    }

    pub async fn delete(&self, user_id: &ID) -> APIResponse<delete_user::APIResponse> {
        self.base
            .delete(format!("user/{}", user_id), StatusCode::OK)
            .await
    }
}
