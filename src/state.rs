use chrono::Duration;
use std::sync::Arc;
use crate::config::Config;
use crate::crypto::token::TokenSigner;
use crate::error::Result;
use crate::repositories::user::{MemoryUserStore, PgUserStore, SharedUserStore};

/// The application's state.
///
/// Holds no per-session data: a token carries the whole session.
#[derive(Clone)]
pub struct AppState {
    /// The user store.
    pub users: SharedUserStore,
    /// The session token signer.
    pub tokens: TokenSigner,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let users: SharedUserStore = match &config.database_url {
            Some(url) => {
                let pool = crate::db::create_pool(url)?;
                crate::db::ensure_schema(&pool).await?;
                tracing::info!("✅ PostgreSQL pool initialized with deadpool-postgres");
                Arc::new(PgUserStore::new(pool))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL not set, using in-memory user store");
                Arc::new(MemoryUserStore::new())
            }
        };

        let tokens = TokenSigner::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours));
        tracing::info!("✅ Token signer initialized (ttl {}h)", config.token_ttl_hours);

        Ok(Self::with_store(users, tokens))
    }

    /// Creates an `AppState` around an existing store and signer.
    pub fn with_store(users: SharedUserStore, tokens: TokenSigner) -> Self {
        AppState { users, tokens }
    }
}
