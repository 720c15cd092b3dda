//! Signed session tokens for the admin area.
//!
//! A token is `base64url(payload.signature)` where the payload is
//! `username:expiry_epoch_millis` and the signature is the hex HMAC-SHA256
//! of the payload under the server-held session secret. Tokens are
//! self-contained; nothing is persisted server-side.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Minimum acceptable length for the session secret
pub const MIN_SECRET_LEN: usize = 16;

/// Fixed session lifetime: 7 days, not refreshed on use
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret is not configured or is shorter than {MIN_SECRET_LEN} characters")]
    SecretUnavailable,
}

/// Verified claims extracted from a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub username: String,
    pub expires_at_millis: i64,
}

fn usable_secret(secret: Option<&str>) -> Option<&str> {
    secret.filter(|s| s.len() >= MIN_SECRET_LEN)
}

fn sign(secret: &str, payload: &str) -> String {
    // new_from_slice only fails for invalid key lengths; HMAC accepts any
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Issue a session token for `username`, valid for 7 days.
///
/// Fails with `SecretUnavailable` when the secret is missing or too short.
/// That is a deployment configuration error, not a user error, and callers
/// must surface it gracefully rather than crash.
pub fn issue(secret: Option<&str>, username: &str) -> Result<String, SessionError> {
    let expires_at = chrono::Utc::now().timestamp_millis() + SESSION_MAX_AGE_SECS * 1000;
    issue_at(secret, username, expires_at)
}

fn issue_at(
    secret: Option<&str>,
    username: &str,
    expires_at_millis: i64,
) -> Result<String, SessionError> {
    let secret = usable_secret(secret).ok_or(SessionError::SecretUnavailable)?;
    let payload = format!("{}:{}", username, expires_at_millis);
    let signature = sign(secret, &payload);
    Ok(BASE64URL.encode(format!("{}.{}", payload, signature)))
}

/// Verify a session token and extract its claims.
///
/// Returns `None` for any malformed, tampered, mis-signed, or expired token.
/// Never panics.
pub fn verify(secret: Option<&str>, token: &str) -> Option<SessionClaims> {
    let secret = usable_secret(secret)?;

    let decoded = BASE64URL.decode(token).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    // Signature is hex, so the last '.' always separates payload from signature
    let (payload, signature) = decoded.rsplit_once('.')?;
    if payload.is_empty() || signature.is_empty() {
        return None;
    }

    let expected = sign(secret, payload);
    if signature.len() != expected.len() {
        return None;
    }
    if !bool::from(signature.as_bytes().ct_eq(expected.as_bytes())) {
        return None;
    }

    let (username, exp_str) = payload.rsplit_once(':')?;
    if username.is_empty() {
        return None;
    }
    let expires_at_millis: i64 = exp_str.parse().ok()?;
    if chrono::Utc::now().timestamp_millis() > expires_at_millis {
        return None;
    }

    Some(SessionClaims {
        username: username.to_string(),
        expires_at_millis,
    })
}
