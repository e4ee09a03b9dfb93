use crate::error::PracticeError;
use crate::notification::{DeliveryResult, NotificationDispatcher, NotificationKind};
use crate::shared::{
    auth::{protect_route, Permission},
    guard::{Guard, ValidationError},
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::send_urgent_message::{APIResponse, PathParams, RequestBody};
use practice_booking_domain::{Booking, UrgentMessage, User, ID};
use practice_booking_infra::PracticeContext;
use tracing::error;

pub async fn send_urgent_message_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (user, policy) = protect_route(&http_req, &ctx).await?;

    let usecase = SendUrgentMessageUseCase {
        sender: user,
        booking_id: path.booking_id.clone(),
        message: Some(body.0.message),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| {
            let email_sent = res.notification.success();
            HttpResponse::Ok().json(APIResponse::new(res.booking, email_sent))
        })
        .map_err(PracticeError::from)
}

/// Sends an ad hoc message to the client of a booking outside of the
/// reminder flow and records it in the message log of the booking
#[derive(Debug)]
pub struct SendUrgentMessageUseCase {
    pub sender: User,
    pub booking_id: ID,
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct SentUrgentMessage {
    pub booking: Booking,
    pub notification: DeliveryResult,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    Validation(ValidationError),
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::Validation(e) => e.into(),
            UseCaseError::NotFound(booking_id) => Self::NotFound(format!(
                "The booking with id: {}, was not found.",
                booking_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendUrgentMessageUseCase {
    type Response = SentUrgentMessage;

    type Error = UseCaseError;

    const NAME: &'static str = "SendUrgentMessage";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        let text = Guard::against_missing(&self.message, "message")
            .map_err(UseCaseError::Validation)?
            .to_string();
        let mut booking = match ctx.repos.bookings.find(&self.booking_id).await {
            Some(booking) => booking,
            None => return Err(UseCaseError::NotFound(self.booking_id.clone())),
        };

        let now = ctx.sys.get_timestamp_millis();
        let message = UrgentMessage {
            text,
            sender: self.sender.email.clone(),
            sent_at: now,
        };
        let appended = ctx
            .repos
            .bookings
            .append_urgent_message(&booking.id, &message, now)
            .await
            .map_err(|e| {
                error!("Unable to store the urgent message: {:?}", e);
                UseCaseError::StorageError
            })?;
        if !appended {
            // Deleted in the meantime
            return Err(UseCaseError::NotFound(self.booking_id.clone()));
        }

        let notification = NotificationDispatcher::new(ctx)
            .dispatch(NotificationKind::UrgentMessage(&message.text), &booking)
            .await;

        booking.urgent_messages.push(message);
        booking.updated = now;
        Ok(SentUrgentMessage {
            booking,
            notification,
        })
    }
}

impl PermissionBoundary for SendUrgentMessageUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::SendUrgentMessage]
    }
}
