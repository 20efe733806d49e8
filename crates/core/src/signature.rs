//! HMAC-SHA256 webhook signature primitives.
//!
//! Providers sign webhook bodies with a shared secret and send the result in
//! a header of the form `t=<unix ts>,v1=<hex digest>` (Stripe) or
//! `ts=<unix ts>,v1=<hex digest>` (Mercado Pago). Verification compares
//! digests in constant time through [`Mac::verify_slice`].

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header missing")]
    Missing,

    #[error("Signature header malformed")]
    Malformed,

    #[error("Signature timestamp outside tolerance")]
    Expired,

    #[error("Signature does not match payload")]
    Mismatch,
}

/// Parsed `t=...,v1=...` style signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// All `v1` digests present (providers send several during secret rotation).
    pub signatures: Vec<String>,
}

/// Parse a comma-separated `key=value` signature header.
///
/// Accepts `t` or `ts` for the timestamp and collects every `v1` entry.
pub fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" | "ts" => {
                timestamp = Some(
                    value
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| SignatureError::Malformed)?,
                );
            }
            "v1" => signatures.push(value.trim().to_string()),
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::Malformed),
    }
}

/// Compute the hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn sign(secret: &str, message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a hex digest against `message` in constant time.
pub fn verify(secret: &str, message: &[u8], signature_hex: &str) -> bool {
    let Some(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

/// Reject a signed timestamp further than `tolerance_secs` from `now`.
///
/// The timestamp comes straight from the request, so any `i64` must be
/// handled without overflow.
pub fn check_timestamp(timestamp: i64, now: i64, tolerance_secs: i64) -> Result<(), SignatureError> {
    let max_skew = u64::try_from(tolerance_secs).unwrap_or(0);
    if now.abs_diff(timestamp) > max_skew {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

/// Verify a timestamped signature over `"{timestamp}.{payload}"`.
///
/// `now` is the current unix time; the signed timestamp must lie within
/// `tolerance_secs` of it.
pub fn verify_timestamped(
    secret: &str,
    header: Option<&str>,
    payload: &[u8],
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let header = parse_header(header.ok_or(SignatureError::Missing)?)?;
    check_timestamp(header.timestamp, now, tolerance_secs)?;

    let mut message = Vec::with_capacity(payload.len() + 12);
    message.extend_from_slice(header.timestamp.to_string().as_bytes());
    message.push(b'.');
    message.extend_from_slice(payload);

    if header
        .signatures
        .iter()
        .any(|sig| verify(secret, &message, sig))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Build a `t=<ts>,v1=<digest>` header for `payload` (used by tests and the
/// mock gateway).
pub fn build_header(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let mut message = Vec::with_capacity(payload.len() + 12);
    message.extend_from_slice(timestamp.to_string().as_bytes());
    message.push(b'.');
    message.extend_from_slice(payload);
    format!("t={timestamp},v1={}", sign(secret, &message))
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` on odd length or non-hex characters.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
            .collect()
    }
}
