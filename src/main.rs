use barber_agenda::configuration::Configuration;
use barber_agenda::configuration_handler::ConfigurationHandler;
use barber_agenda::http::create_app;
use barber_agenda::local_appointments::LocalAppointments;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "postgres")]
async fn database_app(database_url: &str, configuration: ConfigurationHandler) -> axum::Router {
    use barber_agenda::database_interface::DatabaseInterface;
    use std::time::Duration;
    use tokio::time::sleep;
    use tracing::error;

    let backend = loop {
        match DatabaseInterface::new(database_url) {
            Ok(backend) => {
                info!("Successfully connected to database");
                break backend;
            }
            Err(err) => {
                error!(?err, "Failed to establish database connection: {database_url}. Retry in 1 sec. You may want to restart without a database URL (impersistent appointments).");
                sleep(Duration::from_secs(1)).await;
            }
        }
    };
    create_app(backend, configuration)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    info!("Barbershop agenda accessible at {address}");
    let listener = tokio::net::TcpListener::bind(address).await.unwrap();

    let app = match configuration.database_url() {
        #[cfg(feature = "postgres")]
        Some(database_url) => database_app(&database_url, configuration.clone()).await,
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!(
                "Built without the postgres feature; ignoring DATABASE_URL and keeping appointments in memory"
            );
            create_app(LocalAppointments::default(), configuration)
        }
        None => create_app(LocalAppointments::default(), configuration),
    };

    axum::serve(listener, app).await.unwrap();
}
