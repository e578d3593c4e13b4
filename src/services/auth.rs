use crate::crypto::password::{hash_password, verify_decoy, verify_password};
use crate::crypto::token::TokenSigner;
use crate::error::{AppError, Result};
use crate::models::user::{NewUser, PublicUser, User};
use crate::repositories::user::UserStore;
use crate::validation::auth::Credentials;

/// A successful sign-in: the user without their hash, and a fresh token.
#[derive(Debug)]
pub struct SignedIn {
    pub user: PublicUser,
    pub token: String,
}

/// Creates a user with a hashed password.
///
/// # Arguments
///
/// * `users` - The user store.
/// * `email` - The user's email.
/// * `password` - The plaintext password, hashed before it reaches the store.
/// * `name` - The user's display name.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn create_user(
    users: &dyn UserStore,
    email: String,
    password: &str,
    name: String,
) -> Result<User> {
    tracing::debug!("🔐 Creating user: {}", email);
    let password_hash = hash_password(password)?;

    let user = users
        .insert(NewUser {
            email,
            password_hash,
            name,
        })
        .await?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user)
}

/// Creates the user unless one with the same email already exists.
pub async fn ensure_user(
    users: &dyn UserStore,
    email: String,
    password: &str,
    name: String,
) -> Result<User> {
    if let Some(existing) = users.find_by_email(&email).await? {
        tracing::info!("✅ Seed user already present: {}", existing.id);
        return Ok(existing);
    }
    create_user(users, email, password, name).await
}

/// Authenticates a user.
///
/// An unknown email and a wrong password both yield `InvalidCredentials`,
/// and both pay for one Argon2 verification.
///
/// # Returns
///
/// A `Result` containing the authenticated `User`.
pub async fn authenticate_user(users: &dyn UserStore, credentials: &Credentials) -> Result<User> {
    tracing::debug!("🔐 Authenticating user: {}", credentials.email);

    let Some(user) = users.find_by_email(&credentials.email).await? else {
        if let Err(e) = verify_decoy(&credentials.password) {
            tracing::warn!("Decoy verification failed: {}", e);
        }
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&credentials.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok(user)
}

/// Verifies credentials and issues a session token.
pub async fn sign_in(
    users: &dyn UserStore,
    tokens: &TokenSigner,
    credentials: &Credentials,
) -> Result<SignedIn> {
    let user = authenticate_user(users, credentials).await?;
    let token = tokens.issue(user.id, &user.email)?;

    Ok(SignedIn {
        user: user.into(),
        token,
    })
}

/// Resolves a bearer token to the current user record.
///
/// The user is re-fetched by the ID in the token rather than trusted from
/// the claims.
pub async fn resolve_session(
    users: &dyn UserStore,
    tokens: &TokenSigner,
    token: &str,
) -> Result<PublicUser> {
    let claims = tokens.verify(token)?;

    let user = users
        .find_by_id(&claims.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    tracing::debug!("✅ Session resolved for user: {}", user.id);
    Ok(user.into())
}
