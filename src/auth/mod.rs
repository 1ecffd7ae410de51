//! Access token signing and verification.
//!
//! Tokens are compact two-part strings: a base64url-encoded JSON claims
//! payload followed by a base64url-encoded HMAC-SHA256 signature over that
//! payload. A token carries the user id and role and expires a fixed eight
//! hours after issuance.

pub mod password;

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::api::{Role, UserId};

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime in hours.
pub const TOKEN_TTL_HOURS: i64 = 8;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    /// Role recorded at login time.
    pub role: Role,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Errors produced while verifying a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Read the signing secret from the `AUTH_SECRET` environment variable,
    /// falling back to a development default.
    pub fn from_env() -> Self {
        // change in production
        let secret = std::env::var("AUTH_SECRET")
            .unwrap_or_else(|_| "super-secret-key-change-me".to_string());
        Self::new(secret)
    }

    /// Issue a token for `user_id`/`role`, valid for [`TOKEN_TTL_HOURS`]
    /// from `now`.
    pub fn issue(&self, user_id: UserId, role: Role, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user_id.value(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> String {
        // Claims is a plain struct of integers and an enum; serialization
        // cannot fail.
        let payload = serde_json::to_vec(claims).expect("claims serialize");
        let payload_b64 = B64.encode(payload);
        let sig = self.mac(payload_b64.as_bytes());
        format!("{}.{}", payload_b64, B64.encode(sig))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let sig = B64.decode(sig_b64).map_err(|_| TokenError::Malformed)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::BadSignature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&sig).map_err(|_| TokenError::BadSignature)?;

        let payload = B64.decode(payload_b64).map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC key");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Extract the bearer token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (kind, token) = header.split_once(' ')?;
    if kind.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret")
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let now = Utc::now();
        let token = signer().issue(UserId::new(7), Role::Staff, now);
        let claims = signer().verify(&token, now).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Role::Staff);
    }

    #[test]
    fn test_expiry_is_exactly_eight_hours() {
        let now = Utc::now();
        let token = signer().issue(UserId::new(1), Role::Student, now);
        let claims = signer().verify(&token, now).unwrap();
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);

        // Valid one second before expiry, rejected at expiry.
        let just_before = now + Duration::hours(TOKEN_TTL_HOURS) - Duration::seconds(1);
        assert!(signer().verify(&token, just_before).is_ok());
        let at_expiry = now + Duration::hours(TOKEN_TTL_HOURS);
        assert_eq!(signer().verify(&token, at_expiry), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let now = Utc::now();
        let token = signer().issue(UserId::new(1), Role::Student, now);
        let (payload, sig) = token.split_once('.').unwrap();
        let forged_claims = Claims {
            sub: 999,
            role: Role::Admin,
            iat: now.timestamp(),
            exp: now.timestamp() + 3600,
        };
        let forged_payload = B64.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, sig);
        assert_ne!(payload, forged_payload);
        assert_eq!(signer().verify(&forged, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = signer().issue(UserId::new(1), Role::Admin, now);
        let other = TokenSigner::new("another-secret");
        assert_eq!(other.verify(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_tokens_are_malformed() {
        let now = Utc::now();
        assert_eq!(signer().verify("", now), Err(TokenError::Malformed));
        assert_eq!(signer().verify("abc", now), Err(TokenError::Malformed));
        assert_eq!(
            signer().verify("not-base64!.not-base64!", now),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
