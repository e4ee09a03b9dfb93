mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, EmailApiConfig, SchedulingApiConfig};
pub use repos::{
    BookingQuery, DeleteResult, IBookingRepo, IUserRepo, InsertBookingError, LinkedAccount,
    Repos, Session,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct PracticeContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl PracticeContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        Self {
            repos,
            services: Services::from_config(&config),
            config,
            sys: Arc::new(RealSys {}),
        }
    }

    /// Context backed by in-memory repositories, a logging email transport
    /// and no external scheduling service
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            services: Services::create_inmemory(),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> PracticeContext {
    PracticeContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
