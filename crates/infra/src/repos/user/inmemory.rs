use super::{IUserRepo, LinkedAccount, Session};
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use practice_booking_domain::{User, ID};
use std::sync::Mutex;

pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
    sessions: Mutex<Vec<Session>>,
    accounts: Mutex<Vec<LinkedAccount>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
            accounts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        if self.find_by_email(&user.email).await.is_some() {
            return Err(anyhow::anyhow!("User with email {} already exists", user.email));
        }
        insert(user, &self.users);
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        find(user_id, &self.users)
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        find_by(&self.users, |u| u.email == email).into_iter().next()
    }

    async fn find_by_session(&self, token: &str, now: i64) -> Option<User> {
        let session = find_by(&self.sessions, |s| s.token == token && s.expires > now)
            .into_iter()
            .next()?;
        self.find(&session.user_id).await
    }

    async fn insert_session(&self, session: &Session) -> anyhow::Result<()> {
        insert(session, &self.sessions);
        Ok(())
    }

    async fn insert_account(&self, account: &LinkedAccount) -> anyhow::Result<()> {
        insert(account, &self.accounts);
        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.sessions, |s| &s.user_id == user_id))
    }

    async fn delete_accounts_by_user(&self, user_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.accounts, |a| &a.user_id == user_id))
    }

    async fn delete(&self, user_id: &ID) -> Option<User> {
        delete(user_id, &self.users)
    }
}
