//! GraphQL surface
//!
//! Query and mutation roots over `AccountService`, plus the sink that turns
//! refresh tokens into `Set-Cookie` response headers.

mod cookie_sink;
mod schema;

pub use cookie_sink::ResponseCookieSink;
pub use schema::{build_schema, AccountSchema, MutationRoot, QueryRoot};
