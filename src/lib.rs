//! Health journal: a bearer-token authentication service and the client-side
//! session, routing and journal logic that sits on top of it.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

pub mod config;
pub mod error;
pub mod state;
pub mod db;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod user;
    pub mod token;
}

pub mod repositories {
    pub mod user;
}

pub mod services {
    pub mod auth;
}

pub mod handlers {
    pub mod auth;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}

pub mod client;

use state::AppState;

/// Builds the HTTP router for the authentication endpoints.
pub fn build_router(state: AppState) -> Router {
    let signin = post(handlers::auth::signin).fallback(handlers::auth::method_not_allowed);

    let validate = get(handlers::auth::validate)
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .fallback(handlers::auth::method_not_allowed);

    Router::new()
        .route("/auth/signin", signin)
        .route("/auth/validate", validate)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
}
