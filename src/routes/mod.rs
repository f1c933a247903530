mod graphql;
mod health_check;
mod refresh_token;

pub use graphql::{graphiql, graphql};
pub use health_check::health_check;
pub use refresh_token::{refresh_token, RefreshResponse};
