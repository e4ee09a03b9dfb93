mod telemetry;

use practice_booking_api::Application;
use practice_booking_infra::{run_migration, setup_context, PracticeContext};
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("practice_booking_server".into(), "info".into());
    init_subscriber(subscriber);

    let args: Vec<String> = std::env::args().collect();
    let context = if args.last() == Some(&String::from("inmemory")) {
        info!("Starting with in-memory storage");
        PracticeContext::create_inmemory()
    } else {
        run_migration()
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        setup_context().await
    };

    let app = Application::new(context).await?;
    info!("Listening on port {}", app.port());
    app.start().await
}
