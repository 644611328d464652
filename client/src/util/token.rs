//! Bearer-token expiry decoding.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend issues signed, time-limited JWTs. The client reads the `exp`
//! claim without verifying the signature so it can drop a dead session early;
//! the backend still enforces validity on every call. Anything that fails to
//! decode is treated exactly like an expired token.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token expired at {exp}")]
    Expired { exp: i64 },
}

/// Claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    pub sub: Option<String>,
}

/// Current wall-clock time in seconds since the Unix epoch.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

/// Decode the payload segment of a JWT and extract `exp` (and `sub`).
///
/// # Errors
///
/// Returns [`TokenError::Malformed`] when the token is not three dot-separated
/// segments, the payload is not base64url JSON, or `exp` is missing.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::Malformed("expected three segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Malformed(format!("payload is not base64url: {e}")))?;
    let claims: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Malformed(format!("payload is not JSON: {e}")))?;

    let exp = match claims.get("exp") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(float_secs))
            .ok_or_else(|| TokenError::Malformed("exp is out of range".into()))?,
        Some(_) => return Err(TokenError::Malformed("exp is not a number".into())),
        None => return Err(TokenError::Malformed("missing exp claim".into())),
    };
    let sub = claims.get("sub").and_then(Value::as_str).map(str::to_owned);

    Ok(TokenClaims { exp, sub })
}

#[allow(clippy::cast_possible_truncation)]
fn float_secs(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < 9.0e15).then(|| f.floor() as i64)
}

/// Decode and require `exp > now`.
///
/// # Errors
///
/// Returns [`TokenError::Expired`] when expiry is at or before `now`, or
/// [`TokenError::Malformed`] when decoding fails.
pub fn validate(token: &str, now: i64) -> Result<TokenClaims, TokenError> {
    let claims = decode_claims(token)?;
    if claims.exp <= now {
        return Err(TokenError::Expired { exp: claims.exp });
    }
    Ok(claims)
}

/// Mint an unsigned JWT-shaped token carrying `claims`. Test helper.
#[cfg(test)]
pub(crate) fn mint(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Token for `sub` expiring `ttl_secs` from now (negative for the past).
#[cfg(test)]
pub(crate) fn mint_for(sub: &str, ttl_secs: i64) -> String {
    mint(&serde_json::json!({ "sub": sub, "exp": now_unix() + ttl_secs }))
}
