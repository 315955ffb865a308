//! Client-side JWT decoding.
//!
//! Tokens are only decoded here, never verified: the backend owns the
//! signing key and remains the authority. Every failure is folded into a
//! safe default (`None` claims, "expired").

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Deserializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::auth::UserType;

/// Standard alphabet, padding optional. Payloads are translated from the
/// url-safe alphabet before decoding so that tokens using either alphabet
/// are accepted.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in an access token payload.
///
/// Every registered claim is optional; anything not modelled here is kept
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Claims {
    /// Subject (user id). Numeric subjects are kept as their decimal string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "userType")]
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub name: Option<String>,
    /// Expiration time (seconds since the Unix epoch)
    #[serde(default)]
    pub exp: Option<f64>,
    /// Issued at (seconds since the Unix epoch)
    #[serde(default)]
    pub iat: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Decode the payload segment of a compact JWT.
///
/// Returns `None` for fewer than two segments, bad base64, non-UTF-8 bytes,
/// or a payload that is not a JSON object.
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    if payload.is_empty() {
        return None;
    }

    let translated: String = payload
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = PAYLOAD_ENGINE.decode(translated).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    serde_json::from_str(&text).ok()
}

/// Current time in seconds since the Unix epoch.
pub fn now_secs() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Whether the token is expired at `now` (seconds since the epoch).
/// Undecodable tokens and tokens without `exp` count as expired.
pub fn is_expired_at(token: &str, now: u64) -> bool {
    match decode(token).and_then(|claims| claims.exp) {
        Some(exp) => exp < now as f64,
        None => true,
    }
}

/// Whether the token is expired right now. Fails closed.
pub fn is_expired(token: &str) -> bool {
    match now_secs() {
        Some(now) => is_expired_at(token, now),
        None => true,
    }
}

/// Time left before the token expires, or `None` if it already has (or
/// cannot be decoded). Saturates at `Duration::MAX` for far-future claims.
pub fn expires_in(token: &str) -> Option<Duration> {
    let exp = decode(token)?.exp?;
    let now = now_secs()? as f64;
    if exp < now {
        return None;
    }
    Some(Duration::try_from_secs_f64(exp - now).unwrap_or(Duration::MAX))
}
