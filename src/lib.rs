//! Barbershop agenda service: slot availability resolution, the appointment
//! store HTTP API, and a thin REST client for it.

pub mod availability;
pub mod backend;
pub mod client;
pub mod configuration;
pub mod configuration_handler;
#[cfg(feature = "postgres")]
pub mod database_interface;
pub mod error;
pub mod http;
pub mod local_appointments;
#[cfg(feature = "postgres")]
pub mod schema;
#[cfg(test)]
pub mod testutils;
pub mod types;
