use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub user_id: Uuid,
    /// The user's email at issuance.
    pub email: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

/// The fixed JOSE header of every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}
