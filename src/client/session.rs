use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use super::api::AuthApi;
use super::storage::{TokenStorage, TOKEN_KEY};
use super::ClientError;
use crate::models::user::PublicUser;

/// The client's local snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<PublicUser> for SessionUser {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Whether the client is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    /// A token is being checked. Views show a loading state.
    Validating,
    Authenticated(SessionUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// The client session, created at app start and passed down to views.
///
/// Transitions take `&mut self`, so a second login cannot start while one
/// is in flight. Views observe state changes through [`SessionContext::subscribe`].
pub struct SessionContext<A, S> {
    api: A,
    storage: S,
    state: watch::Sender<SessionState>,
}

impl<A: AuthApi, S: TokenStorage> SessionContext<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            api,
            storage,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn transition(&self, next: SessionState) {
        tracing::debug!("Session state -> {:?}", next);
        self.state.send_replace(next);
    }

    /// Rehydrates the session from a stored token.
    ///
    /// Any failure clears the stored token and ends `Unauthenticated`
    /// without surfacing an error.
    pub async fn start(&mut self) -> SessionState {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.transition(SessionState::Unauthenticated);
                return self.state();
            }
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                self.transition(SessionState::Unauthenticated);
                return self.state();
            }
        };

        self.transition(SessionState::Validating);

        match self.api.validate(&token).await {
            Ok(user) => {
                tracing::info!("✅ Session restored for user: {}", user.id);
                self.transition(SessionState::Authenticated(user.into()));
            }
            Err(e) => {
                tracing::debug!("Stored token rejected: {}", e);
                self.discard_token();
                self.transition(SessionState::Unauthenticated);
            }
        }
        self.state()
    }

    /// Signs in and persists the issued token.
    ///
    /// On failure the session returns to `Unauthenticated`, any previously
    /// stored token is dropped, and the error is returned for a transient
    /// notification.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        self.transition(SessionState::Validating);

        let signed_in = match self.api.sign_in(email, password).await {
            Ok(signed_in) => signed_in,
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.discard_token();
                self.transition(SessionState::Unauthenticated);
                return Err(e);
            }
        };

        if let Err(e) = self.storage.set(TOKEN_KEY, &signed_in.token) {
            self.transition(SessionState::Unauthenticated);
            return Err(e);
        }

        let user = SessionUser::from(signed_in.user);
        tracing::info!("✅ Logged in: {}", user.id);
        self.transition(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Signs out. Always ends `Unauthenticated`.
    pub fn logout(&mut self) {
        self.discard_token();
        self.transition(SessionState::Unauthenticated);
        tracing::info!("👋 Logged out");
    }

    fn discard_token(&mut self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!("Failed to remove stored token: {}", e);
        }
    }
}
