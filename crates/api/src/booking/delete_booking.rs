use crate::error::PracticeError;
use crate::shared::{
    auth::{protect_route, Permission},
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::delete_booking::{APIResponse, PathParams};
use practice_booking_domain::{Booking, ID};
use practice_booking_infra::PracticeContext;
use tracing::info;

pub async fn delete_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (_user, policy) = protect_route(&http_req, &ctx).await?;

    let usecase = DeleteBookingUseCase {
        booking_id: path.booking_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|booking| HttpResponse::Ok().json(APIResponse::new(booking)))
        .map_err(PracticeError::from)
}

#[derive(Debug)]
pub struct DeleteBookingUseCase {
    pub booking_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(booking_id) => Self::NotFound(format!(
                "The booking with id: {}, was not found.",
                booking_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteBookingUseCase {
    type Response = Booking;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteBooking";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.bookings.delete(&self.booking_id).await {
            Some(booking) => {
                info!("Booking {} deleted", booking.id);
                Ok(booking)
            }
            None => Err(UseCaseError::NotFound(self.booking_id.clone())),
        }
    }
}

impl PermissionBoundary for DeleteBookingUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::DeleteBooking]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::{client_booking, setup_ctx};
    use crate::shared::auth::Policy;
    use practice_booking_domain::{Role, ServiceType, User};

    #[actix_web::main]
    #[test]
    async fn admins_delete_bookings() {
        let (ctx, _) = setup_ctx();
        let client = User::new("client@example.com", "Jane", Role::Client);
        let booking = client_booking(&client, ServiceType::IndividualTherapy);
        ctx.repos.bookings.insert(&booking).await.unwrap();

        let usecase = DeleteBookingUseCase {
            booking_id: booking.id.clone(),
        };
        assert!(execute_with_policy(usecase, &Policy::for_role(Role::Client), &ctx)
            .await
            .is_err());

        let usecase = DeleteBookingUseCase {
            booking_id: booking.id.clone(),
        };
        let deleted = execute_with_policy(usecase, &Policy::for_role(Role::Admin), &ctx)
            .await
            .unwrap();
        assert_eq!(deleted.id, booking.id);
        assert!(ctx.repos.bookings.find(&booking.id).await.is_none());

        let mut usecase = DeleteBookingUseCase {
            booking_id: booking.id.clone(),
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(booking.id))
        );
    }
}
