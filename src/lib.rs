use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{self, IntoResponse},
    routing::get,
    Router,
};
use http::{header, HeaderValue, Method};
use tower_cookies::{CookieManagerLayer, Cookies, Key};
use tower_http::cors::CorsLayer;

use context::{CookieSession, RequestContext};
use graphql::LiredditSchema;

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod graphql;
pub mod memory;
pub mod password;
pub mod post;
pub mod user;

#[derive(Clone)]
pub struct AppState {
    pub schema: LiredditSchema,
    pub session_key: Key,
}

// Graphql entry.
pub async fn index(
    State(state): State<AppState>,
    cookies: Cookies,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let session = CookieSession::new(cookies, state.session_key.clone());
    let request = req
        .into_inner()
        .data(RequestContext::new(Arc::new(session)));
    state.schema.execute(request).await.into()
}

async fn graphql_playground() -> impl IntoResponse {
    response::Html(GraphiQLSource::build().endpoint("/").finish())
}

pub fn app(state: AppState, cors_origin: Option<&str>) -> Result<Router, anyhow::Error> {
    let mut router = Router::new()
        .route("/", get(graphql_playground).post(index))
        .layer(CookieManagerLayer::new())
        .with_state(state);

    if let Some(origin) = cors_origin {
        let cors = CorsLayer::new()
            .allow_origin(HeaderValue::from_str(origin)?)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);
        router = router.layer(cors);
    }
    Ok(router)
}
