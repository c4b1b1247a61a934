//! Session Token Codec
//!
//! Issues and verifies signed, expiring session tokens. A token is the
//! base64url-encoded JSON claims followed by a base64url HMAC-SHA256 tag
//! over the encoded claims, joined by a dot:
//!
//! ```text
//! <base64url(claims)>.<base64url(hmac-sha256(base64url(claims)))>
//! ```
//!
//! The scheme is deliberately stateless: no server-side session store
//! exists, so a token cannot be revoked before it expires. Revocation is
//! approximated by a short TTL (12 hours by default). If early revocation
//! is ever required it needs a separate denylist, which this codec does
//! not provide.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Verified contents of a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Authenticated identity (the shared operator name)
    pub identity: String,
    /// Expiry instant in epoch milliseconds
    pub expires_at: i64,
}

/// Token verification failure
///
/// A single opaque variant on purpose: callers must not be able to tell a
/// corrupt token from a forged one.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
}

/// Creates and verifies session tokens with a shared secret
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issue a token for `identity`, valid for `ttl` from now.
    ///
    /// The issuance timestamp is always taken here, never supplied by the
    /// caller.
    pub fn issue(&self, identity: &str, ttl: Duration) -> String {
        let claims = TokenClaims {
            identity: identity.to_string(),
            expires_at: (Utc::now() + ttl).timestamp_millis(),
        };
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).expect("token claims always serialize"),
        );
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", payload, tag)
    }

    /// Verify a token and return its claims.
    ///
    /// Fails when the token is missing a segment, is not valid base64, the
    /// tag does not match (compared in constant time), the claims do not
    /// decode, or the expiry has passed. All of these collapse into
    /// [`TokenError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut segments = token.split('.');
        let (payload, tag) = match (segments.next(), segments.next(), segments.next()) {
            (Some(p), Some(t), None) if !p.is_empty() && !t.is_empty() => (p, t),
            _ => return Err(TokenError::Invalid),
        };

        let tag_bytes = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| TokenError::Invalid)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        mac.verify_slice(&tag_bytes).map_err(|_| TokenError::Invalid)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Invalid)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Invalid)?;

        if Utc::now().timestamp_millis() >= claims.expires_at {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret")
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        let token = codec.issue("operator", Duration::hours(1));

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.identity, "operator");
        assert!(claims.expires_at > Utc::now().timestamp_millis());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let token = codec.issue("operator", Duration::milliseconds(-1));

        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let codec = codec();
        let token = codec.issue("operator", Duration::zero());

        // now >= expires_at is a strict boundary
        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_tag_same_length_rejected() {
        let codec = codec();
        let token = codec.issue("operator", Duration::hours(1));

        // Flip one character of the tag without changing its length,
        // confirming the comparison is by value rather than length-only.
        let (payload, tag) = token.split_once('.').unwrap();
        let mut tag_chars: Vec<char> = tag.chars().collect();
        let last = tag_chars.len() - 1;
        tag_chars[last] = if tag_chars[last] == 'A' { 'B' } else { 'A' };
        let tampered: String = tag_chars.into_iter().collect();

        assert_eq!(tampered.len(), tag.len());
        assert!(codec.verify(&format!("{}.{}", payload, tampered)).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec.issue("operator", Duration::hours(1));

        let (payload, tag) = token.split_once('.').unwrap();
        let mut payload_chars: Vec<char> = payload.chars().collect();
        payload_chars[0] = if payload_chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = payload_chars.into_iter().collect();

        assert!(codec.verify(&format!("{}.{}", tampered, tag)).is_err());
    }

    #[test]
    fn test_wrong_segment_count_rejected() {
        let codec = codec();
        assert!(codec.verify("").is_err());
        assert!(codec.verify("justonesegment").is_err());
        assert!(codec.verify("a.b.c").is_err());
        assert!(codec.verify(".").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenCodec::new("secret-a").issue("operator", Duration::hours(1));
        assert!(TokenCodec::new("secret-b").verify(&token).is_err());
    }

    #[test]
    fn test_garbage_base64_rejected() {
        let codec = codec();
        assert!(codec.verify("not base64!.also not base64!").is_err());
    }
}
