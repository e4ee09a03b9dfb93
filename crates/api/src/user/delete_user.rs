use crate::shared::{
    auth::{protect_route, Permission},
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use crate::error::PracticeError;
use actix_web::{web, HttpRequest, HttpResponse};
use practice_booking_api_structs::delete_user::*;
use practice_booking_api_structs::dtos::UserDTO;
use practice_booking_domain::{User, ID};
use practice_booking_infra::PracticeContext;
use tracing::{error, info};

pub async fn delete_user_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<PracticeContext>,
) -> Result<HttpResponse, PracticeError> {
    let (_admin, policy) = protect_route(&http_req, &ctx).await?;

    let usecase = DeleteUserUseCase {
        user_id: path_params.user_id.clone(),
    };
    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                user: UserDTO::new(res.user),
                deleted_bookings: res.deleted_bookings,
                deleted_sessions: res.deleted_sessions,
                deleted_accounts: res.deleted_accounts,
            })
        })
        .map_err(PracticeError::from)
}

/// Removes a user together with everything that belongs to them.
///
/// The store has no cascading deletes so the steps run in order: bookings,
/// sessions, linked accounts and finally the user itself. A failing step
/// stops the saga and the steps already completed are not rolled back, so
/// running it again finishes the job.
#[derive(Debug)]
pub struct DeleteUserUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
    pub deleted_bookings: u64,
    pub deleted_sessions: u64,
    pub deleted_accounts: u64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    UserNotFound(ID),
    StorageError,
}

impl From<UseCaseError> for PracticeError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteUserUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteUser";

    async fn execute(&mut self, ctx: &PracticeContext) -> Result<Self::Response, Self::Error> {
        if ctx.repos.users.find(&self.user_id).await.is_none() {
            return Err(UseCaseError::UserNotFound(self.user_id.clone()));
        }

        let deleted_bookings = ctx
            .repos
            .bookings
            .delete_by_user(&self.user_id)
            .await
            .map_err(|e| {
                error!("Deleting bookings of user {} failed: {:?}", self.user_id, e);
                UseCaseError::StorageError
            })?
            .deleted_count;
        info!("Deleted {} bookings of user {}", deleted_bookings, self.user_id);

        let deleted_sessions = ctx
            .repos
            .users
            .delete_sessions_by_user(&self.user_id)
            .await
            .map_err(|e| {
                error!(
                    "Deleting sessions of user {} failed after bookings were deleted: {:?}",
                    self.user_id, e
                );
                UseCaseError::StorageError
            })?
            .deleted_count;
        info!("Deleted {} sessions of user {}", deleted_sessions, self.user_id);

        let deleted_accounts = ctx
            .repos
            .users
            .delete_accounts_by_user(&self.user_id)
            .await
            .map_err(|e| {
                error!(
                    "Deleting linked accounts of user {} failed after bookings and sessions were deleted: {:?}",
                    self.user_id, e
                );
                UseCaseError::StorageError
            })?
            .deleted_count;
        info!("Deleted {} linked accounts of user {}", deleted_accounts, self.user_id);

        let user = ctx.repos.users.delete(&self.user_id).await.ok_or_else(|| {
            error!(
                "Deleting user {} failed after all of its data was deleted",
                self.user_id
            );
            UseCaseError::StorageError
        })?;
        info!("User {} deleted", user.id);

        Ok(UseCaseRes {
            user,
            deleted_bookings,
            deleted_sessions,
            deleted_accounts,
        })
    }
}

impl PermissionBoundary for DeleteUserUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::DeleteUser]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::tests::{client_booking, setup_ctx};
    use crate::shared::auth::Policy;
    use crate::shared::usecase::UseCaseErrorContainer;
    use practice_booking_domain::{Role, ServiceType};
    use practice_booking_infra::{LinkedAccount, Session};

    #[actix_web::main]
    #[test]
    async fn deletes_user_and_owned_data() {
        let (ctx, _) = setup_ctx();
        let user = User::new("client@example.com", "Jane", Role::Client);
        let other = User::new("other@example.com", "John", Role::Client);
        ctx.repos.users.insert(&user).await.unwrap();
        ctx.repos.users.insert(&other).await.unwrap();
        for _ in 0..2 {
            ctx.repos
                .bookings
                .insert(&client_booking(&user, ServiceType::FamilyTherapy))
                .await
                .unwrap();
        }
        let others_booking = client_booking(&other, ServiceType::TeenCounselling);
        ctx.repos.bookings.insert(&others_booking).await.unwrap();
        ctx.repos
            .users
            .insert_session(&Session {
                token: "token".into(),
                user_id: user.id.clone(),
                expires: i64::MAX,
            })
            .await
            .unwrap();
        ctx.repos
            .users
            .insert_account(&LinkedAccount {
                provider: "google".into(),
                provider_account_id: "123".into(),
                user_id: user.id.clone(),
            })
            .await
            .unwrap();

        let res = execute_with_policy(
            DeleteUserUseCase {
                user_id: user.id.clone(),
            },
            &Policy::for_role(Role::Admin),
            &ctx,
        )
        .await
        .unwrap();

        assert_eq!(res.deleted_bookings, 2);
        assert_eq!(res.deleted_sessions, 1);
        assert_eq!(res.deleted_accounts, 1);
        assert!(ctx.repos.users.find(&user.id).await.is_none());
        assert!(ctx.repos.users.find_by_session("token", 0).await.is_none());
        assert!(ctx.repos.bookings.find(&others_booking.id).await.is_some());
    }

    #[actix_web::main]
    #[test]
    async fn unknown_user_is_not_found() {
        let (ctx, _) = setup_ctx();
        let user_id = ID::default();
        let res = execute_with_policy(
            DeleteUserUseCase {
                user_id: user_id.clone(),
            },
            &Policy::for_role(Role::Admin),
            &ctx,
        )
        .await;
        assert!(matches!(
            res,
            Err(UseCaseErrorContainer::UseCase(UseCaseError::UserNotFound(id))) if id == user_id
        ));
    }

    #[actix_web::main]
    #[test]
    async fn clients_can_not_delete_users() {
        let (ctx, _) = setup_ctx();
        let user = User::new("client@example.com", "Jane", Role::Client);
        ctx.repos.users.insert(&user).await.unwrap();

        let res = execute_with_policy(
            DeleteUserUseCase {
                user_id: user.id.clone(),
            },
            &Policy::for_role(Role::Client),
            &ctx,
        )
        .await;
        assert!(matches!(res, Err(UseCaseErrorContainer::Forbidden(_))));
        assert!(ctx.repos.users.find(&user.id).await.is_some());
    }
}
