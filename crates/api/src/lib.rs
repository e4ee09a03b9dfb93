mod booking;
mod error;
mod job;
mod job_schedulers;
mod notification;
mod shared;
mod status;
mod user;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::{start_send_reminders_job, start_sync_bookings_job};
use practice_booking_infra::PracticeContext;
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use shared::auth::JOB_SECRET_HEADER;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    booking::configure_routes(cfg);
    job::configure_routes(cfg);
    status::configure_routes(cfg);
    user::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: PracticeContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        Application::start_job_schedulers(context);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The passes are normally triggered through the job routes by an
    /// external scheduler. In process loops only run when configured.
    fn start_job_schedulers(context: PracticeContext) {
        if let Some(minutes) = context.config.reminder_job_interval_minutes {
            info!("Running the reminder pass every {} minutes", minutes);
            start_send_reminders_job(context.clone(), minutes);
        }
        if let Some(minutes) = context.config.sync_job_interval_minutes {
            info!("Running the sync pass every {} minutes", minutes);
            start_sync_bookings_job(context, minutes);
        }
    }

    async fn configure_server(context: PracticeContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
