use std::net::TcpListener;
use std::sync::Arc;

use account_service::account::{AccountService, AccountStore, MemoryAccountStore, PgAccountStore};
use account_service::auth::{CookieIssuer, PasswordHasher, TokenIssuer};
use account_service::configuration::{get_configuration, DatabaseSettings};
use account_service::startup::run;
use account_service::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error"
            ));
        }
    };

    let store: Arc<dyn AccountStore> = match &configuration.database {
        Some(database) => Arc::new(PgAccountStore::new(connect_database(database).await?)),
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");
            Arc::new(MemoryAccountStore::new())
        }
    };

    let hasher = PasswordHasher::new(configuration.password.hash_cost).map_err(|e| {
        tracing::error!("Invalid password settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Password settings error")
    })?;

    let tokens = TokenIssuer::new(configuration.jwt.clone());
    let cookie_issuer = CookieIssuer::new(
        configuration.cookie.clone(),
        configuration.jwt.refresh_token_expiry,
    );
    let service = Arc::new(AccountService::new(store, hasher, tokens));

    let address = format!("{}:{}", configuration.application.host, configuration.application.port);
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, service, cookie_issuer, configuration.application.graphiql)?;
    tracing::info!("Server started successfully");

    server.await
}

async fn connect_database(database: &DatabaseSettings) -> std::io::Result<sqlx::PgPool> {
    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error"
            )
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to migrate the database: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
    })?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}
