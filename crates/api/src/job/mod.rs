mod send_due_reminders;
mod sync_external_bookings;

use crate::{error::PracticeError, shared::auth::protect_job_route, shared::usecase::execute};
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::{
    send_due_reminders::APIResponse as SendDueRemindersResponse,
    sync_external_bookings::APIResponse as SyncExternalBookingsResponse,
};
use practice_booking_infra::PracticeContext;

pub use send_due_reminders::SendDueRemindersUseCase;
pub use sync_external_bookings::SyncExternalBookingsUseCase;

async fn sync_external_bookings_controller(
    http_req: HttpRequest,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    protect_job_route(&http_req, &ctx)?;

    execute(SyncExternalBookingsUseCase {}, &ctx)
        .await
        .map(|report| HttpResponse::Ok().json(SyncExternalBookingsResponse::from(report)))
        .map_err(PracticeError::from)
}

async fn send_due_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    protect_job_route(&http_req, &ctx)?;

    execute(SendDueRemindersUseCase {}, &ctx)
        .await
        .map(|report| HttpResponse::Ok().json(SendDueRemindersResponse::from(report)))
        .map_err(PracticeError::from)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/jobs/sync-bookings",
        web::post().to(sync_external_bookings_controller),
    );
    cfg.route(
        "/jobs/send-reminders",
        web::post().to(send_due_reminders_controller),
    );
}
