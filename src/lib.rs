pub mod account;
pub mod auth;
pub mod configuration;
pub mod context;
pub mod error;
pub mod graphql;
pub mod logger;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod validators;
