mod booking;
mod shared;
mod user;

pub use booking::{IBookingRepo, InsertBookingError};
use booking::{InMemoryBookingRepo, PostgresBookingRepo};
pub use shared::query_structs::*;
pub use shared::repo::DeleteResult;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user::{IUserRepo, LinkedAccount, Session};
use user::{InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub bookings: Arc<dyn IBookingRepo>,
    pub users: Arc<dyn IUserRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            bookings: Arc::new(InMemoryBookingRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
        }
    }
}
