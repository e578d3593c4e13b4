use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

/// The raw sign-in body. Fields are optional so that a missing field is a
/// validation error rather than a deserialization failure.
#[derive(Deserialize, Default)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Sign-in credentials that passed boundary validation.
pub struct Credentials {
    pub email: String,
    pub password: Zeroizing<String>,
}

impl SignInRequest {
    /// Validates the request into typed credentials.
    ///
    /// # Returns
    ///
    /// `Credentials`, or a validation error when either field is absent or empty.
    pub fn into_credentials(self) -> Result<Credentials> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok(Credentials {
                    email,
                    password: Zeroizing::new(password),
                })
            }
            _ => Err(AppError::Validation(
                "Email and password are required".to_string(),
            )),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// # Returns
///
/// The token, or `MissingToken` when the header is absent or malformed.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingToken)
}
