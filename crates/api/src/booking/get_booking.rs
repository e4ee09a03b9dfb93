use crate::error::PracticeError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::get_booking::{APIResponse, PathParams};
use practice_booking_domain::{Booking, User, ID};
use practice_booking_infra::PracticeContext;

pub async fn get_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (user, _policy) = protect_route(&http_req, &ctx).await?;

    let usecase = GetBookingUseCase {
        user,
        booking_id: path.booking_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|booking| HttpResponse::Ok().json(APIResponse::new(booking)))
        .map_err(PracticeError::from)
}

#[derive(Debug)]
pub struct GetBookingUseCase {
    pub user: User,
    pub booking_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    Forbidden(ID),
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(booking_id) => Self::NotFound(format!(
                "The booking with id: {}, was not found.",
                booking_id
            )),
            UseCaseError::Forbidden(booking_id) => Self::Forbidden(format!(
                "The booking with id: {}, belongs to another user.",
                booking_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBookingUseCase {
    type Response = Booking;

    type Error = UseCaseError;

    const NAME: &'static str = "GetBooking";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        match ctx.repos.bookings.find(&self.booking_id).await {
            Some(booking) if booking.can_be_managed_by(&self.user) => Ok(booking),
            Some(_) => Err(UseCaseError::Forbidden(self.booking_id.clone())),
            None => Err(UseCaseError::NotFound(self.booking_id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::{client_booking, setup_ctx};
    use practice_booking_domain::{Role, ServiceType};

    #[actix_web::main]
    #[test]
    async fn only_owners_and_admins_can_get_bookings() {
        let (ctx, _) = setup_ctx();
        let owner = User::new("client@example.com", "Jane", Role::Client);
        let other = User::new("other@example.com", "John", Role::Client);
        let admin = User::new("admin@practice.example", "Admin", Role::Admin);
        let booking = client_booking(&owner, ServiceType::CouplesTherapy);
        ctx.repos.bookings.insert(&booking).await.unwrap();

        for user in vec![owner, admin] {
            let mut usecase = GetBookingUseCase {
                user,
                booking_id: booking.id.clone(),
            };
            assert_eq!(usecase.execute(&ctx).await, Ok(booking.clone()));
        }

        let mut usecase = GetBookingUseCase {
            user: other.clone(),
            booking_id: booking.id.clone(),
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::Forbidden(booking.id.clone()))
        );

        let missing = ID::default();
        let mut usecase = GetBookingUseCase {
            user: other,
            booking_id: missing.clone(),
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(missing))
        );
    }
}
