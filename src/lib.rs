// Library exports for the users API
// This allows the modules to be tested

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod vector;

pub use config::Config;
pub use database::DatabasePool;
pub use error::{AppError, AppResult};

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabasePool,
    pub config: Config,
}

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, X-API-Key";
pub const CORS_MAX_AGE: &str = "86400";

pub fn create_app(state: AppState) -> Router {
    // `{*id}` never matches an empty segment, so `/users/` is routed explicitly
    let user_by_id = get(handlers::users::get_user)
        .put(handlers::users::update_user)
        .delete(handlers::users::delete_user)
        .fallback(handlers::route_not_found);

    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users)
                .post(handlers::users::create_user)
                .fallback(handlers::route_not_found),
        )
        .route("/users/", user_by_id.clone())
        .route("/users/{*id}", user_by_id)
        .fallback(handlers::route_not_found)
        // Middleware stack, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static(CORS_ALLOW_ORIGIN),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(CORS_ALLOW_METHODS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOW_HEADERS),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from_static(CORS_MAX_AGE),
                ))
                .layer(CatchPanicLayer::custom(handlers::handle_panic))
                .layer(middleware::from_fn(handlers::preflight))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    handlers::require_api_key,
                ))
                .layer(middleware::from_fn(handlers::reject_head)),
        )
        .with_state(state)
}
