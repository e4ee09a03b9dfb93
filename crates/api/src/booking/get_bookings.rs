use crate::error::PracticeError;
use crate::shared::{
    auth::protect_route,
    guard::ValidationError,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use futures::TryStreamExt;
use practice_booking_api_structs::get_bookings::{APIResponse, QueryParams};
use practice_booking_domain::{Booking, BookingStatus, User, ID};
use practice_booking_infra::{BookingQuery, PracticeContext};
use tracing::error;

pub async fn get_bookings_controller(
    http_req: HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (user, _policy) = protect_route(&http_req, &ctx).await?;

    let query = query.into_inner();
    let usecase = GetBookingsUseCase {
        user,
        statuses: query.status,
        date_from: query.from,
        date_to: query.to,
        user_id: query.user_id,
        descending: query.descending.unwrap_or(false),
    };

    execute(usecase, &ctx)
        .await
        .map(|bookings| HttpResponse::Ok().json(APIResponse::new(bookings)))
        .map_err(PracticeError::from)
}

/// Lists bookings. Clients only ever see their own bookings, admins see
/// every booking and can filter by owner.
#[derive(Debug)]
pub struct GetBookingsUseCase {
    pub user: User,
    /// Comma separated statuses
    pub statuses: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub user_id: Option<ID>,
    pub descending: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    Validation(ValidationError),
    StorageError,
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::Validation(e) => e.into(),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

fn parse_statuses(statuses: &str) -> Result<Vec<BookingStatus>, ValidationError> {
    statuses
        .split(',')
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .map(|status| {
            status
                .parse::<BookingStatus>()
                .map_err(|e| ValidationError(e.to_string()))
        })
        .collect()
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBookingsUseCase {
    type Response = Vec<Booking>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetBookings";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        let statuses = match &self.statuses {
            Some(statuses) => {
                Some(parse_statuses(statuses).map_err(UseCaseError::Validation)?)
            }
            None => None,
        };
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(UseCaseError::Validation(ValidationError(
                    "`from` has to be before `to`".into(),
                )));
            }
        }
        let user_id = if self.user.is_admin() {
            self.user_id.clone()
        } else {
            Some(self.user.id.clone())
        };

        let query = BookingQuery {
            statuses,
            date_from: self.date_from,
            date_to: self.date_to,
            user_id,
            descending: self.descending,
        };
        ctx.repos
            .bookings
            .stream(query)
            .try_collect()
            .await
            .map_err(|e| {
                error!("Unable to list bookings: {:?}", e);
                UseCaseError::StorageError
            })
    }
}
