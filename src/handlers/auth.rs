use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::{
    error::{AppError, Result},
    models::user::{PublicUser, SignInResponse},
    services::auth as auth_service,
    state::AppState,
    validation::auth::SignInRequest,
};

/// Handles sign-in.
///
/// A body that is not valid JSON is treated like one with no fields.
pub async fn signin(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!("Unreadable sign-in body: {}", rejection);
            SignInRequest::default()
        }
    };
    tracing::info!("🔐 Sign-in attempt - Payload: {:?}", payload);

    let credentials = payload.into_credentials()?;

    let signed_in =
        auth_service::sign_in(state.users.as_ref(), &state.tokens, &credentials).await?;

    tracing::info!("✅ User signed in: {}", signed_in.user.id);

    let response = SignInResponse {
        user: signed_in.user,
        token: signed_in.token,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the user resolved by `require_auth`.
pub async fn validate(Extension(user): Extension<PublicUser>) -> Json<PublicUser> {
    tracing::debug!("✅ Token validated for user: {}", user.id);
    Json(user)
}

/// Fallback for a known path hit with the wrong method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
