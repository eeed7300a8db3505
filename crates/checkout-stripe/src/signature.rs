//! # Stripe Webhook Signatures
//!
//! Verification of the `Stripe-Signature` header.
//!
//! The header carries a timestamp and one or more signatures:
//!
//! ```text
//! t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd
//! ```
//!
//! Each `v1` is a hex HMAC-SHA256 over `"{t}.{raw body}"` keyed with the
//! endpoint's signing secret. The body must be the bytes exactly as received.

use checkout_core::{PaymentError, PaymentResult, WebhookEvent};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (either direction) of a signature timestamp, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed `Stripe-Signature` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

/// Parse a signature header.
///
/// Entries are `key=value` pairs separated by `,` or `;`. Keys other than
/// `t` and `v1` are ignored.
pub fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split([',', ';']) {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" => {
                timestamp = Some(value.trim().parse::<i64>().map_err(|_| {
                    PaymentError::SignatureInvalid("Invalid timestamp in signature".to_string())
                })?);
            }
            "v1" => signatures.push(value.trim().to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::SignatureInvalid("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::SignatureInvalid(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_payload_mac(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Compute the hex `v1` signature for a payload
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<String> {
    let mac = signed_payload_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature header against a payload at time `now` (unix seconds)
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> PaymentResult<()> {
    let sig_parts = parse_signature_header(header)?;

    // abs_diff cannot overflow, whatever `t` the header claims
    if now.abs_diff(sig_parts.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(PaymentError::SignatureInvalid(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected = signed_payload_mac(secret, sig_parts.timestamp, payload)?;

    // verify_slice compares in constant time
    let valid = sig_parts.signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| expected.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if !valid {
        return Err(PaymentError::SignatureInvalid(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

/// Verify the header and parse the payload into an event
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
) -> PaymentResult<WebhookEvent> {
    verify_signature(payload, header, secret, tolerance_secs, Utc::now().timestamp())?;

    let event = WebhookEvent::from_slice(payload)?;
    debug!(event_type = %event.event_type, "Verified Stripe webhook");
    Ok(event)
}

/// Build a valid header for `payload`, as Stripe would send it
pub fn generate_test_header(payload: &[u8], secret: &str, timestamp: i64) -> PaymentResult<String> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}
