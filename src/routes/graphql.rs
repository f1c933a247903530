//! GraphQL endpoint
//!
//! `POST /graphql` executes operations against the account schema. The
//! typed `RequestContext` (request id + bearer token) is attached to every
//! request; cookies set by resolvers come back as response headers.

use actix_web::{web, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::context::RequestContext;
use crate::graphql::AccountSchema;

pub async fn graphql(
    schema: web::Data<AccountSchema>,
    req: HttpRequest,
    gql_request: GraphQLRequest,
) -> GraphQLResponse {
    let context = RequestContext::from_http(&req);
    tracing::debug!(request_id = %context.request_id, "Executing GraphQL request");

    schema
        .execute(gql_request.into_inner().data(context))
        .await
        .into()
}

/// GET /graphql
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
