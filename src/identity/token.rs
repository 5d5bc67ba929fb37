use base64::Engine;
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Payload claims carried in the backend's access token. The token is a
/// three-segment dot-delimited structure (header.payload.signature); only the
/// payload is inspected here, without signature verification. Verification is
/// the backend's job; this side only needs the identity and role hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// True when the `exp` claim (seconds since epoch) is at or before `now_secs`.
    /// Tokens without an `exp` claim never expire from this side's view.
    pub fn is_expired(&self, now_secs: i64) -> bool {
        match self.exp {
            Some(exp) => exp <= now_secs,
            None => false,
        }
    }

    pub fn role(&self) -> Role {
        self.role_id.map(Role::from_code).unwrap_or_default()
    }
}

fn b64url_decode(seg: &str) -> Option<Vec<u8>> {
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    URL_SAFE_NO_PAD
        .decode(seg)
        .ok()
        .or_else(|| URL_SAFE.decode(seg).ok())
}

/// Decode the payload segment of an access token. Returns `None` for anything
/// that is not exactly three dot-delimited segments with a base64url JSON
/// payload; never panics.
pub fn decode_jwt(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    let _signature = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let bytes = b64url_decode(payload)?;
    serde_json::from_slice(&bytes).ok()
}

/// Resolve the caller's role from a stored token, if any. Absent, malformed or
/// undecodable tokens, and unknown role codes, all degrade to the default role.
pub fn role_from_token(token: Option<&str>) -> Role {
    token
        .and_then(decode_jwt)
        .map(|claims| claims.role())
        .unwrap_or_default()
}
