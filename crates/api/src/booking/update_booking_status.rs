use crate::error::PracticeError;
use crate::notification::{DeliveryResult, NotificationDispatcher, NotificationKind};
use crate::shared::{
    auth::{protect_route, Permission},
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::update_booking_status::{APIResponse, PathParams, RequestBody};
use practice_booking_domain::{Booking, BookingStatus, InvalidTransition, User, ID};
use practice_booking_infra::PracticeContext;
use tracing::{error, info};

pub async fn update_booking_status_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (user, policy) = protect_route(&http_req, &ctx).await?;

    let usecase = UpdateBookingStatusUseCase {
        user,
        booking_id: path.booking_id.clone(),
        status: body.status,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| {
            let email_sent = res.notification.map(|n| n.success()).unwrap_or(false);
            HttpResponse::Ok().json(APIResponse::new(res.booking, email_sent))
        })
        .map_err(PracticeError::from)
}

#[derive(Debug)]
pub struct UpdateBookingStatusUseCase {
    pub user: User,
    pub booking_id: ID,
    pub status: BookingStatus,
}

#[derive(Debug)]
pub struct UpdatedBooking {
    pub booking: Booking,
    /// Set when the transition notifies the client
    pub notification: Option<DeliveryResult>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    Forbidden(ID),
    InvalidTransition(InvalidTransition),
    /// The status was changed by someone else in the meantime
    ConcurrentUpdate(ID),
    StorageError,
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(booking_id) => Self::NotFound(format!(
                "The booking with id: {}, was not found.",
                booking_id
            )),
            UseCaseError::Forbidden(booking_id) => Self::Forbidden(format!(
                "Not allowed to change the status of the booking with id: {}.",
                booking_id
            )),
            UseCaseError::InvalidTransition(e) => Self::Conflict(e.to_string()),
            UseCaseError::ConcurrentUpdate(booking_id) => Self::Conflict(format!(
                "The status of the booking with id: {}, was changed concurrently. Please retry.",
                booking_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateBookingStatusUseCase {
    type Response = UpdatedBooking;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateBookingStatus";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        let mut booking = match ctx.repos.bookings.find(&self.booking_id).await {
            Some(booking) => booking,
            None => return Err(UseCaseError::NotFound(self.booking_id.clone())),
        };
        if !booking.can_be_managed_by(&self.user) {
            return Err(UseCaseError::Forbidden(self.booking_id.clone()));
        }

        let current = booking.status;
        let next = current
            .transition(self.status)
            .map_err(UseCaseError::InvalidTransition)?;

        let now = ctx.sys.get_timestamp_millis();
        let applied = ctx
            .repos
            .bookings
            .update_status(&booking.id, current, next, now)
            .await
            .map_err(|e| {
                error!("Unable to update booking status: {:?}", e);
                UseCaseError::StorageError
            })?;
        if !applied {
            return Err(UseCaseError::ConcurrentUpdate(booking.id));
        }
        booking.status = next;
        booking.updated = now;
        info!(
            "Booking {} changed status from {} to {}",
            booking.id, current, next
        );

        let notification = match next {
            BookingStatus::Confirmed => Some(
                NotificationDispatcher::new(ctx)
                    .dispatch(NotificationKind::BookingConfirmed, &booking)
                    .await,
            ),
            _ => None,
        };

        Ok(UpdatedBooking {
            booking,
            notification,
        })
    }
}

impl PermissionBoundary for UpdateBookingStatusUseCase {
    fn permissions(&self) -> Vec<Permission> {
        match self.status {
            BookingStatus::Cancelled => vec![Permission::CancelBooking],
            _ => vec![Permission::UpdateBookingStatus],
        }
    }
}
