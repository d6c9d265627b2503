//! GraphQL routes: `/graphql` for queries and mutations, `/graphql/ws` for
//! subscriptions.
//!
//! A bearer token is resolved to an [`Identity`] once per request (or once per
//! WebSocket connection) and attached to the request data. Invalid tokens are
//! treated as anonymous; the gates decide what anonymous callers may do.

use std::sync::Arc;

use async_graphql::Data;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use crate::AppState;
use crate::graphql::Identity;
use crate::services::AuthService;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws_handler))
}

/// Extract bearer token from Authorization header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn identity_data(identity: Option<Identity>) -> Data {
    let mut data = Data::default();
    if let Some(identity) = identity {
        data.insert(identity);
    }
    data
}

/// GraphQL query/mutation handler with auth context
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    match extract_token(&headers).and_then(|token| state.auth.identify(&token)) {
        Some(identity) => request = request.data(identity),
        None => tracing::trace!("Anonymous GraphQL request"),
    }

    state.schema.execute(request).await.into()
}

/// GraphiQL interactive playground (only for browsers)
async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql/ws")
                .finish(),
        )
        .into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

/// GraphQL WebSocket handler for subscriptions.
///
/// The token may come from the upgrade request headers or from the
/// `Authorization` field of the connection-init payload.
async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let header_identity = extract_token(&headers).and_then(|token| state.auth.identify(&token));
    let auth: Arc<AuthService> = state.auth.clone();

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            GraphQLWebSocket::new(socket, state.schema.clone(), protocol)
                .on_connection_init(move |params| async move {
                    let init_identity = params
                        .get("Authorization")
                        .or_else(|| params.get("authorization"))
                        .and_then(|v| v.as_str())
                        .and_then(|token| {
                            let token = token.strip_prefix("Bearer ").unwrap_or(token);
                            auth.identify(token)
                        });
                    Ok(identity_data(init_identity.or(header_identity)))
                })
                .serve()
        })
}
