use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::account::AccountService;
use crate::auth::CookieIssuer;
use crate::graphql::build_schema;
use crate::logger::LoggerMiddleware;
use crate::routes::{graphiql, graphql, health_check, refresh_token};

pub fn run(
    listener: TcpListener,
    service: Arc<AccountService>,
    cookie_issuer: CookieIssuer,
    enable_graphiql: bool,
) -> Result<Server, std::io::Error> {
    let schema = web::Data::new(build_schema(service.clone(), cookie_issuer.clone()));
    let service = web::Data::from(service);
    let cookie_issuer = web::Data::new(cookie_issuer);

    let server = HttpServer::new(move || {
        let mut app = App::new()
            // Global middleware
            .wrap(Logger::default())      // Standard logging
            .wrap(LoggerMiddleware)       // Request id + timing

            // Shared state
            .app_data(schema.clone())
            .app_data(service.clone())
            .app_data(cookie_issuer.clone())

            .route("/health_check", web::get().to(health_check))
            .route("/graphql", web::post().to(graphql))
            .route("/refresh_token", web::post().to(refresh_token));

        if enable_graphiql {
            app = app.route("/graphql", web::get().to(graphiql));
        }

        app
    })
    .listen(listener)?
    .run();

    Ok(server)
}
