use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ClientError;
use crate::models::user::{PublicUser, SignInResponse};

/// The authentication endpoints as seen from the client.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a user and a token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ClientError>;

    /// Resolves a token to its user.
    async fn validate(&self, token: &str) -> Result<PublicUser, ClientError>;
}

#[derive(Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// `AuthApi` over HTTP.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Creates a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn rejected(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/signin"))
            .json(&SignInBody { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(response.json().await?)
    }

    async fn validate(&self, token: &str) -> Result<PublicUser, ClientError> {
        let response = self
            .client
            .get(self.url("/auth/validate"))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(response.json().await?)
    }
}
