//! Bearer token inspection.
//!
//! Reads the claims segment of a JWT without verifying its signature. The
//! server remains the authority on validity; these checks only let the client
//! skip requests it already knows will be rejected.
//!
//! Every function accepts anything convertible into `Option<&str>`, so both a
//! bare `&str` and a session's optional token can be passed directly. An
//! absent or empty token is handled exactly like a malformed one.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::DecodeError;

/// Default expiring-soon threshold: 5 minutes.
pub const DEFAULT_WARNING_THRESHOLD_MS: i64 = 5 * 60 * 1000;

/// Value returned by [`time_until_expiry`] for tokens that cannot be read.
pub const INVALID_TOKEN_REMAINING_MS: i64 = -1;

/// Number of leading characters kept by [`token_preview`].
const PREVIEW_LEN: usize = 20;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// JWTs use the URL-safe alphabet; some issuers still emit the standard one.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Decoded view of a token's claims segment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Expiry (unix seconds, possibly fractional).
    pub exp: Option<f64>,
    /// Issued at (unix seconds).
    pub iat: Option<f64>,
    /// Remaining claims, kept as raw JSON.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenClaims {
    /// Subject claim, when it is a string.
    pub fn subject(&self) -> Option<&str> {
        self.extra.get("sub").and_then(|v| v.as_str())
    }

    /// Absolute expiry time.
    pub fn expiry(&self) -> Result<DateTime<Utc>, DecodeError> {
        let exp = self.exp.ok_or(DecodeError::MissingExpiry)?;
        if !exp.is_finite() {
            return Err(DecodeError::MissingExpiry);
        }
        let millis = (exp * 1000.0).round();
        if millis.abs() >= i64::MAX as f64 {
            return Err(DecodeError::MissingExpiry);
        }
        DateTime::from_timestamp_millis(millis as i64).ok_or(DecodeError::MissingExpiry)
    }
}

/// Decode the claims segment of `token`.
pub fn decode_claims<'a>(token: impl Into<Option<&'a str>>) -> Result<TokenClaims, DecodeError> {
    let token = token
        .into()
        .filter(|t| !t.is_empty())
        .ok_or(DecodeError::Absent)?;

    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| DecodeError::Malformed("missing claims segment".into()))?;

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .map_err(|e| DecodeError::Malformed(format!("claims segment is not base64: {e}")))?;

    serde_json::from_slice::<TokenClaims>(&bytes)
        .map_err(|e| DecodeError::InvalidClaims(e.to_string()))
}

/// Extract the absolute expiry time from `token`.
pub fn decode_expiry<'a>(token: impl Into<Option<&'a str>>) -> Result<DateTime<Utc>, DecodeError> {
    decode_claims(token)?.expiry()
}

/// Expiry time, or `None` when the token cannot be read.
pub fn expiration_time<'a>(token: impl Into<Option<&'a str>>) -> Option<DateTime<Utc>> {
    decode_expiry(token).ok()
}

/// Whether `token` is expired at `now`. Unreadable tokens are expired.
pub fn is_expired_at<'a>(token: impl Into<Option<&'a str>>, now: DateTime<Utc>) -> bool {
    match decode_expiry(token) {
        Ok(expiry) => expiry <= now,
        Err(e) => {
            debug!(error = %e, "treating unreadable token as expired");
            true
        }
    }
}

/// Whether `token` is expired right now.
pub fn is_expired<'a>(token: impl Into<Option<&'a str>>) -> bool {
    is_expired_at(token, Utc::now())
}

/// Signed milliseconds between `now` and the token's expiry.
///
/// Returns [`INVALID_TOKEN_REMAINING_MS`] for unreadable tokens.
pub fn time_until_expiry_at<'a>(token: impl Into<Option<&'a str>>, now: DateTime<Utc>) -> i64 {
    match decode_expiry(token) {
        Ok(expiry) => (expiry - now).num_milliseconds(),
        Err(_) => INVALID_TOKEN_REMAINING_MS,
    }
}

/// Signed milliseconds until the token expires.
pub fn time_until_expiry<'a>(token: impl Into<Option<&'a str>>) -> i64 {
    time_until_expiry_at(token, Utc::now())
}

/// Whether `0 < remaining < threshold_ms` at `now`.
pub fn is_expiring_soon_at<'a>(
    token: impl Into<Option<&'a str>>,
    threshold_ms: i64,
    now: DateTime<Utc>,
) -> bool {
    let remaining = time_until_expiry_at(token, now);
    remaining > 0 && remaining < threshold_ms
}

/// Whether the token expires within `threshold_ms` from now.
pub fn is_expiring_soon<'a>(token: impl Into<Option<&'a str>>, threshold_ms: i64) -> bool {
    is_expiring_soon_at(token, threshold_ms, Utc::now())
}

/// Shortened token for log lines.
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(PREVIEW_LEN).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::test_support::{token_with_claims, token_with_exp};

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn absent_token_is_expired() {
        assert!(is_expired(None::<&str>));
        assert!(is_expired(""));
        assert_eq!(decode_expiry(None::<&str>), Err(DecodeError::Absent));
    }

    #[test]
    fn token_without_claims_segment_is_malformed() {
        assert!(matches!(
            decode_expiry("not-a-jwt"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(is_expired("not-a-jwt"));
        assert!(is_expired("header..signature"));
    }

    #[test]
    fn non_base64_claims_are_malformed() {
        assert!(matches!(
            decode_expiry("a.!!!!.c"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn non_json_claims_are_invalid() {
        let payload = URL_SAFE_LENIENT.encode(b"not json");
        let token = format!("h.{payload}.s");
        assert!(matches!(
            decode_expiry(token.as_str()),
            Err(DecodeError::InvalidClaims(_))
        ));
        assert!(is_expired(token.as_str()));
    }

    #[test]
    fn missing_exp_counts_as_expired() {
        let token = token_with_claims(serde_json::json!({ "sub": "alice" }));
        assert_eq!(decode_expiry(token.as_str()), Err(DecodeError::MissingExpiry));
        assert!(is_expired(token.as_str()));
        assert_eq!(time_until_expiry(token.as_str()), INVALID_TOKEN_REMAINING_MS);
    }

    #[test]
    fn decodes_expiry_and_subject() {
        let now = fixed_now();
        let exp = now + Duration::minutes(10);
        let token = token_with_exp(exp.timestamp());
        let claims = decode_claims(token.as_str()).unwrap();
        assert_eq!(claims.subject(), Some("alice"));
        assert_eq!(claims.expiry().unwrap(), exp);
        assert_eq!(expiration_time(token.as_str()), Some(exp));
    }

    #[test]
    fn accepts_standard_alphabet_with_padding() {
        let payload = STANDARD_LENIENT.encode(br#"{"exp":1700000600,"note":"??>"}"#);
        let token = format!("h.{payload}.s");
        assert_eq!(
            decode_expiry(token.as_str()).unwrap().timestamp(),
            1_700_000_600
        );
    }

    #[test]
    fn fractional_exp_is_respected() {
        let token = token_with_claims(serde_json::json!({ "exp": 1_700_000_000.5 }));
        let expiry = decode_expiry(token.as_str()).unwrap();
        assert_eq!(expiry.timestamp_millis(), 1_700_000_000_500);
    }

    #[test]
    fn expired_at_or_before_now() {
        let now = fixed_now();
        let past = token_with_exp(now.timestamp() - 1);
        let exact = token_with_exp(now.timestamp());
        let future = token_with_exp(now.timestamp() + 1);
        assert!(is_expired_at(past.as_str(), now));
        assert!(is_expired_at(exact.as_str(), now));
        assert!(!is_expired_at(future.as_str(), now));
    }

    #[test]
    fn time_until_expiry_is_signed_difference() {
        let now = fixed_now();
        let future = token_with_exp(now.timestamp() + 90);
        let past = token_with_exp(now.timestamp() - 90);
        assert_eq!(time_until_expiry_at(future.as_str(), now), 90_000);
        assert_eq!(time_until_expiry_at(past.as_str(), now), -90_000);
        assert_eq!(time_until_expiry_at("garbage", now), INVALID_TOKEN_REMAINING_MS);
    }

    #[test]
    fn four_minutes_left_is_expiring_soon() {
        let now = fixed_now();
        let token = token_with_exp(now.timestamp() + 240);
        assert!(is_expiring_soon_at(
            token.as_str(),
            DEFAULT_WARNING_THRESHOLD_MS,
            now
        ));
        assert_eq!(time_until_expiry_at(token.as_str(), now), 240_000);
    }

    #[test]
    fn expiring_soon_excludes_boundaries() {
        let now = fixed_now();
        let at_zero = token_with_exp(now.timestamp());
        let at_threshold = token_with_exp(now.timestamp() + 300);
        let beyond = token_with_exp(now.timestamp() + 600);
        assert!(!is_expiring_soon_at(at_zero.as_str(), DEFAULT_WARNING_THRESHOLD_MS, now));
        assert!(!is_expiring_soon_at(
            at_threshold.as_str(),
            DEFAULT_WARNING_THRESHOLD_MS,
            now
        ));
        assert!(!is_expiring_soon_at(beyond.as_str(), DEFAULT_WARNING_THRESHOLD_MS, now));
        assert!(!is_expiring_soon_at(None::<&str>, DEFAULT_WARNING_THRESHOLD_MS, now));
    }

    #[test]
    fn preview_truncates_to_twenty_chars() {
        let preview = token_preview("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(preview, "abcdefghijklmnopqrst...");
        assert_eq!(token_preview("short"), "short...");
    }
}
