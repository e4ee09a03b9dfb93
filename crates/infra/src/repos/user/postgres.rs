use super::{IUserRepo, LinkedAccount, Session};
use crate::repos::shared::repo::DeleteResult;
use practice_booking_domain::{Role, User, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    email: String,
    name: String,
    role: String,
}

impl From<UserRaw> for User {
    fn from(raw: UserRaw) -> Self {
        Self {
            id: raw.user_uid.into(),
            email: raw.email,
            name: raw.name,
            role: Role::from_db(&raw.role),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users(user_uid, email, name, role)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find user {}: {:?}", user_id, e))
        .ok()?
        .map(User::from)
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find user by email: {:?}", e))
        .ok()?
        .map(User::from)
    }

    async fn find_by_session(&self, token: &str, now: i64) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT u.* FROM users AS u
            INNER JOIN sessions AS s
                ON s.user_uid = u.user_uid
            WHERE s.session_token = $1 AND s.expires > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find user by session: {:?}", e))
        .ok()?
        .map(User::from)
    }

    async fn insert_session(&self, session: &Session) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions(session_token, user_uid, expires)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id.inner_ref())
        .bind(session.expires)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_account(&self, account: &LinkedAccount) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts(provider, provider_account_id, user_uid)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(&account.provider)
        .bind(&account.provider_account_id)
        .bind(account.user_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult> {
        let deleted_count = sqlx::query("DELETE FROM sessions WHERE user_uid = $1")
            .bind(user_id.inner_ref())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(DeleteResult { deleted_count })
    }

    async fn delete_accounts_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult> {
        let deleted_count = sqlx::query("DELETE FROM accounts WHERE user_uid = $1")
            .bind(user_id.inner_ref())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(DeleteResult { deleted_count })
    }

    async fn delete(&self, user_id: &ID) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            DELETE FROM users
            WHERE user_uid = $1
            RETURNING *
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to delete user {}: {:?}", user_id, e))
        .ok()?
        .map(User::from)
    }
}
