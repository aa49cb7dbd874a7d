//! Unverified JWT claim inspection.
//!
//! The provider's operator token is a JWT. We never validate its signature
//! (the provider does that); we only read `exp` to know when to refresh.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<serde_json::Number>,
}

fn claims_only() -> Validation {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Expiry of a JWT in milliseconds since the Unix epoch.
///
/// Returns `0` when the token is not a JWT, its payload is not JSON or it
/// carries no numeric `exp` claim, so a cache treats it as already expired.
pub fn expiry_ms(token: &str) -> i64 {
    decode_exp_seconds(token)
        .map(|exp| exp.saturating_mul(1000))
        .unwrap_or(0)
}

fn decode_exp_seconds(token: &str) -> Option<i64> {
    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &claims_only()).ok()?;
    let exp = data.claims.exp?;
    exp.as_i64()
        .or_else(|| exp.as_f64().map(|secs| secs as i64))
}
