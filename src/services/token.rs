//! Session credential service
//!
//! Mints and verifies the signed, self-contained session credential that
//! gates every schedule mutation. A credential is two base64url parts
//! joined by a dot: the JSON claims payload and an HMAC-SHA256 signature
//! over the encoded payload, keyed by the server secret.
//!
//! Verification is stateless and pure given the secret: no store lookup,
//! no revocation list. Expiry is the only built-in termination.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use data_encoding::BASE64URL_NOPAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::models::{Claims, User};

type HmacSha256 = Hmac<Sha256>;

/// Error types for credential verification
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed input or signature mismatch
    #[error("Credential is malformed or badly signed")]
    Invalid,

    /// Credential past its validity window
    #[error("Credential has expired")]
    Expired,
}

/// Mints and verifies signed session credentials
pub struct TokenService {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with the given secret and validity window.
    pub fn new(secret: impl Into<Vec<u8>>, ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Mint a credential for a user, valid from now for the configured window.
    pub fn mint(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            name: user.credential_name().to_string(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Serialize and sign a claims payload into wire form.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let payload = serde_json::to_vec(claims).context("Failed to serialize claims")?;
        let payload_b64 = BASE64URL_NOPAD.encode(&payload);
        let signature = self.signature_for(payload_b64.as_bytes())?;
        Ok(format!("{}.{}", payload_b64, BASE64URL_NOPAD.encode(&signature)))
    }

    /// Verify a credential and extract its claims.
    ///
    /// Order of checks: shape, signature, then expiry. A tampered
    /// credential never reaches the expiry comparison.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Invalid)?;

        let signature = BASE64URL_NOPAD
            .decode(signature_b64.as_bytes())
            .map_err(|_| TokenError::Invalid)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Invalid)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::Invalid)?;

        let payload = BASE64URL_NOPAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if claims.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn signature_for(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow::anyhow!("Invalid HMAC key: {}", e))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 7)
    }

    fn admin() -> User {
        User {
            id: 7,
            username: "ana".to_string(),
            password_hash: String::new(),
            display_name: Some("Ana Souza".to_string()),
            is_admin: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mint_then_verify_round_trip() {
        let tokens = service();
        let token = tokens.mint(&admin()).expect("mint");

        let claims = tokens.verify(&token).expect("verify");
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.name, "Ana Souza");
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_missing_dot_is_invalid() {
        assert!(matches!(service().verify("nodothere"), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let tokens = service();
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
        assert!(matches!(tokens.verify("a.b"), Err(TokenError::Invalid)));
        assert!(matches!(
            tokens.verify("!!not-base64!!.@@neither@@"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let tokens = service();
        let token = tokens.mint(&admin()).expect("mint");

        // Promote a different payload under the original signature
        let (_, signature) = token.split_once('.').unwrap();
        let forged_claims = Claims {
            sub: 999,
            name: "intruder".to_string(),
            is_admin: true,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged_payload =
            BASE64URL_NOPAD.encode(&serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);

        assert!(matches!(tokens.verify(&forged), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = service().mint(&admin()).expect("mint");
        let other = TokenService::new("another-secret", 7);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expired_credential_fails_despite_valid_signature() {
        let tokens = service();
        let now = Utc::now();
        let stale = Claims {
            sub: 7,
            name: "Ana Souza".to_string(),
            is_admin: true,
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = tokens.sign(&stale).expect("sign");

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }
}
