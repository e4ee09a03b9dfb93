use crate::{error::PracticeError, shared::auth::protect_route};
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::get_me::*;
use practice_booking_infra::PracticeContext;

pub async fn get_me_controller(
    http_req: HttpRequest,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (user, _) = protect_route(&http_req, &ctx).await?;

    Ok(HttpResponse::Ok().json(APIResponse::new(user)))
}
