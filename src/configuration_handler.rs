use crate::configuration::Configuration;
use clap::Parser;

/// Runtime configuration from CLI flags, with environment fallbacks loaded
/// through `.env`.
#[derive(Debug, Clone, Parser)]
#[command(name = "barber_agenda", about = "Barbershop appointment store")]
pub struct ConfigurationHandler {
    /// Port the HTTP API binds to.
    #[arg(long, default_value = "3000")]
    port: String,

    /// Password required on the x-admin-password header for admin routes.
    #[arg(long)]
    admin_password: Option<String>,

    /// Postgres connection URL; bookings are kept in memory when unset.
    #[arg(long)]
    database_url: Option<String>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        let mut configuration = Self::parse();
        if configuration.admin_password.is_none() {
            configuration.admin_password = std::env::var("ADMIN_PASSWORD").ok();
        }
        if configuration.database_url.is_none() {
            configuration.database_url = std::env::var("DATABASE_URL").ok();
        }
        configuration
    }
}

impl Configuration for ConfigurationHandler {
    fn admin_password(&self) -> String {
        self.admin_password.clone().unwrap_or_else(|| "123".into())
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }
}
