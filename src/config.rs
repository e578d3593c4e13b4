use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// Minimum accepted length of the token signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default lifetime of an issued session token.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 8760;

/// A user ensured to exist at startup, for development setups.
#[derive(Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: Zeroizing<String>,
    pub name: String,
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// The secret used to sign session tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// The lifetime of a session token in hours.
    pub token_ttl_hours: i64,
    /// The address the server binds to.
    pub bind_addr: SocketAddr,
    /// The origin allowed by CORS.
    pub cors_origin: String,
    /// Optional fixture user.
    pub seed_user: Option<SeedUser>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut secret = env::var("JWT_SECRET")
            .context("JWT_SECRET must be set (generate with: openssl rand -hex 32)")?;
        let jwt_secret = Zeroizing::new(secret.as_bytes().to_vec());
        secret.zeroize();

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN);
        }

        let token_ttl_hours = match env::var("TOKEN_TTL_HOURS") {
            Ok(raw) => parse_token_ttl_hours(&raw)?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            token_ttl_hours,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            seed_user: seed_user_from_env()?,
        })
    }

    /// Builds a configuration for in-process use with the in-memory store.
    pub fn for_secret(secret: &[u8]) -> Self {
        Self {
            database_url: None,
            jwt_secret: Zeroizing::new(secret.to_vec()),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cors_origin: "http://localhost:3000".to_string(),
            seed_user: None,
        }
    }
}

/// Parses `TOKEN_TTL_HOURS`, accepting `1..=MAX_TOKEN_TTL_HOURS`.
pub fn parse_token_ttl_hours(raw: &str) -> Result<i64> {
    let hours: i64 = raw.trim().parse().context("Invalid TOKEN_TTL_HOURS")?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        anyhow::bail!(
            "TOKEN_TTL_HOURS must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_HOURS,
            hours
        );
    }
    Ok(hours)
}

fn seed_user_from_env() -> Result<Option<SeedUser>> {
    let email = env::var("SEED_USER_EMAIL").ok();
    let password = env::var("SEED_USER_PASSWORD").ok();
    let name = env::var("SEED_USER_NAME").ok();

    match (email, password, name) {
        (None, None, None) => Ok(None),
        (Some(email), Some(password), Some(name)) => Ok(Some(SeedUser {
            email,
            password: Zeroizing::new(password),
            name,
        })),
        _ => anyhow::bail!(
            "SEED_USER_EMAIL, SEED_USER_PASSWORD and SEED_USER_NAME must be set together"
        ),
    }
}
