use crate::error::{AppError, Result};
use crate::models::token::{Claims, TokenHeader};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies HS256 session tokens in JWT compact form.
///
/// No registry of issued tokens is kept: a token is valid exactly when its
/// signature matches and it has not expired.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl TokenSigner {
    /// Creates a new `TokenSigner`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            ttl,
        }
    }

    /// Issues a token for `user_id` and `email`, expiring `ttl` from now.
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: Uuid, email: &str, now: DateTime<Utc>) -> Result<String> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let header = encode_segment(&TokenHeader::default())?;
        let payload = encode_segment(&claims)?;
        let signing_input = format!("{}.{}", header, payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);

        tracing::debug!("🔑 Issued token for user {} (exp {})", user_id, claims.exp);
        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token against the instant `now`.
    ///
    /// The signature is checked before the payload is parsed, and expiry is
    /// checked last, so an expired token fails even when correctly signed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::InvalidToken("malformed token".to_string()));
        };

        let header: TokenHeader = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(AppError::InvalidToken(format!(
                "unsupported algorithm {}",
                header.alg
            )));
        }

        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::InvalidToken("malformed signature".to_string()))?;
        let signing_input = &token[..token.len() - signature.len() - 1];
        let expected = self.sign(signing_input.as_bytes())?;

        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Err(AppError::InvalidToken("signature mismatch".to_string()));
        }

        let claims: Claims = decode_segment(payload)?;
        if now.timestamp() >= claims.exp {
            return Err(AppError::InvalidToken(format!(
                "token expired for user {}",
                claims.user_id
            )));
        }

        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = sonic_rs::to_vec(value)
        .map_err(|e| AppError::Internal(format!("Token serialization failed: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AppError::InvalidToken("malformed segment".to_string()))?;
    sonic_rs::from_slice(&bytes)
        .map_err(|_| AppError::InvalidToken("malformed segment".to_string()))
}
