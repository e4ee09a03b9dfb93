use super::Policy;
use crate::error::PracticeError;
use actix_web::HttpRequest;
use practice_booking_domain::User;
use practice_booking_infra::PracticeContext;
use tracing::warn;

pub const JOB_SECRET_HEADER: &str = "x-job-secret";

fn parse_authtoken_header(token_header_value: &str) -> String {
    token_header_value
        .replace("Bearer", "")
        .replace("bearer", "")
        .trim()
        .to_string()
}

async fn auth_user_req(req: &HttpRequest, ctx: &PracticeContext) -> Option<User> {
    let token = req.headers().get("authorization")?;
    let token = match token.to_str() {
        Ok(token) => parse_authtoken_header(token),
        Err(_) => return None,
    };
    if token.is_empty() {
        return None;
    }
    ctx.repos
        .users
        .find_by_session(&token, ctx.sys.get_timestamp_millis())
        .await
}

/// Resolves the `User` behind the session token of the request
/// together with the `Policy` of its role
pub async fn protect_route(
    req: &HttpRequest,
    ctx: &PracticeContext,
) -> Result<(User, Policy), PracticeError> {
    match auth_user_req(req, ctx).await {
        Some(user) => {
            let policy = Policy::for_role(user.role);
            Ok((user, policy))
        }
        None => Err(PracticeError::Unauthorized(
            "Unable to find user from credentials".into(),
        )),
    }
}

/// Job endpoints are called by the external job scheduler with the shared secret
pub fn protect_job_route(req: &HttpRequest, ctx: &PracticeContext) -> Result<(), PracticeError> {
    let secret = req
        .headers()
        .get(JOB_SECRET_HEADER)
        .and_then(|secret| secret.to_str().ok());
    match secret {
        Some(secret) if secret == ctx.config.job_secret => Ok(()),
        Some(_) => {
            warn!("Job triggered with an invalid secret");
            Err(PracticeError::Unauthorized("Invalid job secret".into()))
        }
        None => Err(PracticeError::Unauthorized(format!(
            "Missing the `{}` header",
            JOB_SECRET_HEADER
        ))),
    }
}
