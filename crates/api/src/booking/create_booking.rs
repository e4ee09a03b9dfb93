use crate::error::PracticeError;
use crate::notification::{DeliveryResult, NotificationDispatcher, NotificationKind};
use crate::shared::{
    auth::{protect_route, Permission},
    guard::{Guard, ValidationError},
    usecase::{execute_with_policy, PermissionBoundary, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::TimeZone;
use practice_booking_api_structs::create_booking::{APIResponse, RequestBody};
use practice_booking_domain::{format_duration, Booking, NewDirectBooking, User};
use practice_booking_infra::PracticeContext;
use tracing::{error, info};

pub async fn create_booking_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (user, policy) = protect_route(&http_req, &ctx).await?;

    let body = body.0;
    let usecase = CreateBookingUseCase {
        user,
        service: body.service,
        date: body.date,
        time: body.time,
        duration: body.duration,
        phone: body.phone,
        notes: body.notes,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| {
            let email_sent = res.notification.success();
            HttpResponse::Created().json(APIResponse::new(res.booking, email_sent))
        })
        .map_err(PracticeError::from)
}

#[derive(Debug)]
pub struct CreateBookingUseCase {
    pub user: User,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub struct CreatedBooking {
    pub booking: Booking,
    /// Outcome of the booking received email to the client
    pub notification: DeliveryResult,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    Validation(ValidationError),
    StorageError,
}

impl From<ValidationError> for UseCaseError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::Validation(e) => e.into(),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

fn non_empty(val: &Option<String>) -> Option<String> {
    val.as_deref()
        .map(str::trim)
        .filter(|val| !val.is_empty())
        .map(String::from)
}

impl CreateBookingUseCase {
    fn validate(&self, ctx: &PracticeContext) -> Result<NewDirectBooking, ValidationError> {
        let service = Guard::against_unknown_service(Guard::against_missing(
            &self.service,
            "service",
        )?)?;
        let date = Guard::against_malformed_date(Guard::against_missing(&self.date, "date")?)?;
        let time = Guard::against_malformed_time(Guard::against_missing(&self.time, "time")?)?;
        let duration_minutes = match non_empty(&self.duration) {
            Some(duration) => Guard::against_malformed_duration(&duration)?,
            None => service.default_duration_minutes(),
        };

        let tz = ctx.config.practice_timezone;
        let start = tz
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| {
                ValidationError(format!(
                    "The time {} does not exist on {} in the practice timezone",
                    time, date
                ))
            })?;
        if start.timestamp_millis() <= ctx.sys.get_timestamp_millis() {
            return Err(ValidationError(
                "The appointment has to be in the future".into(),
            ));
        }

        Ok(NewDirectBooking {
            user: self.user.clone(),
            service,
            date,
            time,
            duration: format_duration(duration_minutes),
            duration_minutes,
            phone: non_empty(&self.phone),
            notes: non_empty(&self.notes),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateBookingUseCase {
    type Response = CreatedBooking;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateBooking";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        let params = self.validate(ctx)?;
        let booking = Booking::new_direct(params, ctx.sys.get_timestamp_millis());

        if let Err(e) = ctx.repos.bookings.insert(&booking).await {
            error!("Unable to store the booking: {:?}", e);
            return Err(UseCaseError::StorageError);
        }
        info!("Booking {} created by user {}", booking.id, self.user.id);

        // The booking exists at this point whatever happens to the email
        let notification = NotificationDispatcher::new(ctx)
            .dispatch(NotificationKind::BookingReceived, &booking)
            .await;

        Ok(CreatedBooking {
            booking,
            notification,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyAdminsOnBookingCreated)]
    }
}

impl PermissionBoundary for CreateBookingUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::CreateBooking]
    }
}

/// Alerts the practice admins about every new booking
pub struct NotifyAdminsOnBookingCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateBookingUseCase> for NotifyAdminsOnBookingCreated {
    async fn notify(&self, e: &CreatedBooking, ctx: &PracticeContext) {
        // Sideeffect, ignore result
        let _ = NotificationDispatcher::new(ctx)
            .dispatch(NotificationKind::AdminNewBooking, &e.booking)
            .await;
    }
}
