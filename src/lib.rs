pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod query;
pub mod server;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

/// The full HTTP surface: public and protected routes plus global layers.
pub fn app(state: AppState) -> Router {
    let api = &state.config().api;
    let timeout = Duration::from_secs(api.request_timeout_secs);
    let body_limit = api.max_request_size_bytes;

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(from_fn(i18n::locale_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/login", post(public::login_post))
        .route("/health", get(public::health_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/profile", get(protected::profile_get).post(protected::profile_post))
        .route("/profile/password", post(protected::password_post))
        .route(
            "/user",
            get(protected::user_list)
                .post(protected::user_post)
                .put(protected::user_put),
        )
        .route("/user/:id", get(protected::user_get).delete(protected::user_delete))
        .route(
            "/admin",
            get(protected::admin_list)
                .post(protected::admin_post)
                .put(protected::admin_put),
        )
        .route("/admin/:id", get(protected::admin_get).delete(protected::admin_delete))
        .route_layer(from_fn_with_state(state, middleware::session_auth_middleware))
}

/// Browser clients on any http(s) origin; no credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| o.starts_with("http://") || o.starts_with("https://"))
                .unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .max_age(Duration::from_secs(300))
}
