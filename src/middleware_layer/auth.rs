use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    services::auth as auth_service,
    state::AppState,
    validation::auth::bearer_token,
};

/// A middleware that requires a valid bearer token.
///
/// On success the caller's `PublicUser` is inserted as a request extension.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an `AppError` mapped to `401`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header_value)?.to_string();

    let user = auth_service::resolve_session(state.users.as_ref(), &state.tokens, &token).await?;

    tracing::debug!("✅ User authenticated: {}", user.id);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
