//! Test fixture generators

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::auth::TokenResponse;

const UNSIGNED_HEADER: &str = r#"{"alg":"none","typ":"JWT"}"#;

/// Compact JWT with `claims` as payload and a dummy signature
#[must_use]
pub fn jwt_with_claims(claims: &serde_json::Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(UNSIGNED_HEADER),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Compact JWT expiring at `exp` (epoch seconds)
///
/// ```
/// use pca_common::auth::{jwt::decode_payload, AccessClaims};
/// use pca_common::testing::jwt_with_exp;
///
/// let claims: AccessClaims = decode_payload(&jwt_with_exp(2_000)).unwrap();
/// assert!(claims.is_live_at(1_999));
/// assert!(!claims.is_live_at(2_000));
/// ```
#[must_use]
pub fn jwt_with_exp(exp: i64) -> String {
    jwt_with_claims(&serde_json::json!({ "exp": exp, "token_use": "access" }))
}

/// Token response built from plain strings
#[must_use]
pub fn token_response(id: &str, access: &str, refresh: Option<&str>) -> TokenResponse {
    TokenResponse::new(id, access, refresh.map(str::to_string))
}
