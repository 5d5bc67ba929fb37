//! Identity tests: role code mapping, token payload decoding, the token
//! store, session lifecycle and the auth provider state machine.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use tempfile::tempdir;

use claimgate::client::{
    ApiError, BackendApi, ClaimHandler, Credentials, DraftReceipt, LoginResponse, ProfilePayload,
    ResetPasswordRequest, SubmitReceipt,
};
use claimgate::identity::{
    decode_jwt, role_from_token, AuthProvider, Principal, Role, SessionManager, TokenStore,
};
use claimgate::intimation::IntimationForm;

fn b64url(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn forge_token(payload: serde_json::Value) -> String {
    let header = b64url(br#"{"alg":"HS256","typ":"JWT"}"#);
    format!("{}.{}.{}", header, b64url(payload.to_string().as_bytes()), b64url(b"sig"))
}

fn admin_token() -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    forge_token(json!({"id": 7, "email": "admin@example.com", "role_id": 4, "iat": 0, "exp": exp}))
}

#[test]
fn role_codes_map_and_unknown_codes_default() {
    assert_eq!(Role::from_code(1), Role::ClaimHandler);
    assert_eq!(Role::from_code(2), Role::ClaimIntimation);
    assert_eq!(Role::from_code(3), Role::Auditor);
    assert_eq!(Role::from_code(4), Role::Admin);
    for code in [-1, 0, 5, 42, i64::MAX, i64::MIN] {
        assert_eq!(Role::from_code(code), Role::ClaimIntimation, "code {}", code);
    }
    assert_eq!(Role::Admin.as_code(), 4);
    assert_eq!(Role::Auditor.label(), "auditor");
}

#[test]
fn role_labels_round_trip_and_unknown_labels_are_rejected() {
    for role in [Role::ClaimHandler, Role::ClaimIntimation, Role::Auditor, Role::Admin] {
        assert_eq!(Role::from_label(role.label()), Some(role));
    }
    assert_eq!(Role::from_label("superuser"), None);
    assert_eq!(Role::from_label(""), None);
    assert_eq!(Role::from_label("Admin"), None);
}

#[test]
fn decode_jwt_rejects_malformed_tokens() {
    assert!(decode_jwt("").is_none());
    assert!(decode_jwt("justonechunk").is_none());
    assert!(decode_jwt("two.chunks").is_none());
    assert!(decode_jwt("a.b.c.d").is_none());
    // payload not base64url
    assert!(decode_jwt("head.!!!.sig").is_none());
    // payload base64url but not JSON
    assert!(decode_jwt(&format!("h.{}.s", b64url(b"not json"))).is_none());
    // payload JSON but missing required fields
    assert!(decode_jwt(&format!("h.{}.s", b64url(br#"{"foo": 1}"#))).is_none());
}

#[test]
fn decode_jwt_reads_payload_claims() {
    let token = forge_token(json!({"id": 12, "email": "a@b.c", "role_id": 3, "iat": 100, "exp": 200}));
    let claims = decode_jwt(&token).expect("claims");
    assert_eq!(claims.id, 12);
    assert_eq!(claims.email, "a@b.c");
    assert_eq!(claims.role(), Role::Auditor);
    assert!(claims.is_expired(200));
    assert!(!claims.is_expired(199));
}

#[test]
fn decode_jwt_accepts_padded_base64() {
    let payload = json!({"id": 1, "email": "x@y.z", "role_id": 1}).to_string();
    let padded = base64::engine::general_purpose::URL_SAFE.encode(payload.as_bytes());
    let claims = decode_jwt(&format!("h.{}.s", padded)).expect("claims");
    assert_eq!(claims.role(), Role::ClaimHandler);
    // no exp claim: never expires
    assert!(!claims.is_expired(i64::MAX));
}

#[test]
fn role_from_token_degrades_to_default() {
    assert_eq!(role_from_token(None), Role::ClaimIntimation);
    assert_eq!(role_from_token(Some("garbage")), Role::ClaimIntimation);
    let no_role = forge_token(json!({"id": 1, "email": "x@y.z"}));
    assert_eq!(role_from_token(Some(&no_role)), Role::ClaimIntimation);
    let unknown_role = forge_token(json!({"id": 1, "email": "x@y.z", "role_id": 9}));
    assert_eq!(role_from_token(Some(&unknown_role)), Role::ClaimIntimation);
    assert_eq!(role_from_token(Some(&admin_token())), Role::Admin);
}

#[test]
fn token_store_round_trip_and_removal() -> Result<()> {
    let tmp = tempdir()?;
    let store = TokenStore::new(tmp.path());
    assert!(store.access_token().is_none());
    store.set_access_token("tok-123")?;
    assert_eq!(store.access_token().as_deref(), Some("tok-123"));
    store.clear_access_token();
    assert!(store.access_token().is_none());
    // removing again is fine
    store.clear_access_token();

    assert!(store.pending_profile_user().is_none());
    store.set_pending_profile_user(&json!({"email": "new@user.io"}))?;
    assert_eq!(
        store.pending_profile_user().unwrap()["email"],
        json!("new@user.io")
    );
    store.clear_pending_profile_user();
    assert!(store.pending_profile_user().is_none());
    Ok(())
}

#[test]
fn session_issue_validate_logout() {
    let sm = SessionManager::default();
    let principal = Principal {
        user_id: "7".into(),
        email: "admin@example.com".into(),
        role: Role::Admin,
        attrs: Default::default(),
    };
    let sess = sm.issue(principal.clone());
    assert_ne!(sess.session_id, sess.token);
    let seen = sm.validate(&sess.token).expect("valid session");
    assert_eq!(seen, principal);
    assert!(sm.logout(&sess.token));
    assert!(sm.validate(&sess.token).is_none());
    // second logout is a no-op
    assert!(!sm.logout(&sess.token));
}

#[test]
fn revoking_a_user_kills_every_session_they_hold() {
    let sm = SessionManager::default();
    let target = Principal { user_id: "revoked-user-31".into(), ..Default::default() };
    let bystander = Principal { user_id: "bystander-31".into(), ..Default::default() };

    let a = sm.issue(target.clone());
    let b = sm.issue(target.clone());
    let c = sm.issue(bystander);

    assert_eq!(sm.revoke_user("revoked-user-31"), 2);
    assert!(sm.validate(&a.token).is_none());
    assert!(sm.validate(&b.token).is_none());
    // the other user's session is untouched
    assert!(sm.validate(&c.token).is_some());
    // nothing left to revoke
    assert_eq!(sm.revoke_user("revoked-user-31"), 0);
    assert_eq!(sm.revoke_user("never-seen"), 0);
}

#[test]
fn session_with_zero_ttl_is_immediately_expired() {
    let sm = SessionManager { ttl: Duration::ZERO };
    let sess = sm.issue(Principal { user_id: "u".into(), ..Default::default() });
    assert!(sm.validate(&sess.token).is_none());
}

// --- Auth provider over a scripted backend ---

struct MockBackend {
    token: String,
    accept_password: &'static str,
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        if credentials.password == self.accept_password {
            Ok(LoginResponse { access_token: self.token.clone() })
        } else {
            Err(ApiError::Message("Invalid credentials".into()))
        }
    }

    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<(), ApiError> {
        if req.token == "valid-reset" { Ok(()) } else { Err(ApiError::Message("token expired".into())) }
    }

    async fn complete_profile(&self, _payload: &ProfilePayload) -> Result<(), ApiError> {
        Ok(())
    }

    async fn get_claim_handlers(&self) -> Result<Vec<ClaimHandler>, ApiError> {
        Ok(Vec::new())
    }

    async fn save_draft(&self, _form: &IntimationForm) -> Result<DraftReceipt, ApiError> {
        Err(ApiError::Status(503))
    }

    async fn submit_intimation(&self, _form: &IntimationForm) -> Result<SubmitReceipt, ApiError> {
        Err(ApiError::Status(503))
    }
}

fn provider_in(dir: &std::path::Path) -> AuthProvider<MockBackend> {
    let api = MockBackend { token: admin_token(), accept_password: "s3cr3t!" };
    AuthProvider::new(api, TokenStore::new(dir))
}

#[tokio::test]
async fn login_success_stores_token_and_authenticates() -> Result<()> {
    let tmp = tempdir()?;
    let mut auth = provider_in(tmp.path());
    let creds = Credentials { email: "admin@example.com".into(), password: "s3cr3t!".into() };
    assert!(auth.login(&creds).await);
    assert!(auth.state.is_authenticated);
    assert!(!auth.state.is_loading);
    assert!(auth.state.error.is_none());
    let user = auth.state.user.as_ref().expect("user");
    assert_eq!(user.id, 7);
    assert_eq!(user.role, Role::Admin);
    assert!(auth.store().access_token().is_some());
    Ok(())
}

#[tokio::test]
async fn login_failure_sets_friendly_error_and_stays_unauthenticated() -> Result<()> {
    let tmp = tempdir()?;
    let mut auth = provider_in(tmp.path());
    let creds = Credentials { email: "admin@example.com".into(), password: "wrong".into() };
    assert!(!auth.login(&creds).await);
    assert!(!auth.state.is_authenticated);
    assert!(auth.state.user.is_none());
    assert_eq!(
        auth.state.error.as_deref(),
        Some("The email or password you entered is incorrect.")
    );
    assert!(auth.store().access_token().is_none());

    auth.clear_error();
    assert!(auth.state.error.is_none());
    Ok(())
}

#[tokio::test]
async fn logout_clears_store_and_resets_state() -> Result<()> {
    let tmp = tempdir()?;
    let mut auth = provider_in(tmp.path());
    let creds = Credentials { email: "admin@example.com".into(), password: "s3cr3t!".into() };
    assert!(auth.login(&creds).await);
    auth.logout();
    assert!(!auth.state.is_authenticated);
    assert!(auth.state.user.is_none());
    assert!(auth.store().access_token().is_none());
    Ok(())
}

#[tokio::test]
async fn restore_accepts_live_tokens_and_discards_expired_ones() -> Result<()> {
    let tmp = tempdir()?;
    {
        let mut auth = provider_in(tmp.path());
        auth.store().set_access_token(&admin_token())?;
        auth.restore();
        assert!(auth.state.is_authenticated);
        assert_eq!(auth.state.user.as_ref().unwrap().role, Role::Admin);
    }

    let tmp2 = tempdir()?;
    {
        let expired = forge_token(json!({
            "id": 7, "email": "admin@example.com", "role_id": 4,
            "iat": 0, "exp": chrono::Utc::now().timestamp() - 60,
        }));
        let mut auth = provider_in(tmp2.path());
        auth.store().set_access_token(&expired)?;
        auth.restore();
        assert!(!auth.state.is_authenticated);
        // stale token is dropped from the store
        assert!(auth.store().access_token().is_none());
    }
    Ok(())
}

#[tokio::test]
async fn reset_password_reports_outcome_through_state() -> Result<()> {
    let tmp = tempdir()?;
    let mut auth = provider_in(tmp.path());
    assert!(auth.reset_password("valid-reset", "newpass!").await);
    assert!(auth.state.error.is_none());

    assert!(!auth.reset_password("stale-reset", "newpass!").await);
    assert_eq!(
        auth.state.error.as_deref(),
        Some("This link has expired. Please request a new one.")
    );
    Ok(())
}
