//!
//! claimgate HTTP shell
//! --------------------
//! Axum-based JSON surface for the claims intimation portal.
//!
//! Responsibilities:
//! - Cookie-identified sessions issued on login against the external backend.
//! - Navigation gating for the portal's route surface via `/guard`.
//! - Per-session intimation form state driven by `FormAction` posts.
//! - Draft save and submit proxied to the backend, recording the identifiers
//!   it returns.

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::client::{ApiError, BackendApi, Credentials, HttpBackend, ProfilePayload, ResetPasswordRequest};
use crate::error::{user_friendly_message, AppError};
use crate::guard::{protected_route, route_guard, GuardDecision};
use crate::identity::{decode_jwt, role_from_token, AuthState, AuthUser, Principal, Role, SessionManager};
use crate::intimation::{FormAction, IntimationForm};

const SESSION_COOKIE: &str = "claimgate_session";

/// Shared server state injected into all handlers.
///
/// Holds the backend client, the session manager, and the per-session
/// intimation form table keyed by session token.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn BackendApi>,
    pub sessions: Arc<SessionManager>,
    pub forms: Arc<RwLock<HashMap<String, IntimationForm>>>,
}

impl AppState {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            sessions: Arc::new(SessionManager::default()),
            forms: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let http_port: u16 = std::env::var("CLAIMGATE_HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(7070);
    let api_base = std::env::var("CLAIMGATE_API_BASE")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    run_with_port(http_port, Arc::new(HttpBackend::new(api_base))).await
}

pub async fn run_with_port(http_port: u16, backend: Arc<dyn BackendApi>) -> anyhow::Result<()> {
    let app = router(AppState::new(backend));
    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting claimgate on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "claimgate ok" }))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/reset-password", post(reset_password))
        .route("/profile-completion", post(profile_completion))
        .route("/claim-handlers", get(claim_handlers))
        .route("/guard", get(guard_decision))
        .route("/intimation", get(intimation_snapshot))
        .route("/intimation/action", post(intimation_action))
        .route("/intimation/draft", post(intimation_draft))
        .route("/intimation/submit", post(intimation_submit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name { return Some(v[1..].to_string()); }
        }
    }
    None
}

fn session_principal(state: &AppState, headers: &HeaderMap) -> Option<(String, Principal)> {
    let token = parse_cookie(headers, SESSION_COOKIE)?;
    let principal = state.sessions.validate(&token)?;
    Some((token, principal))
}

fn set_session_cookie(token: &str) -> HeaderValue {
    // Secure, HttpOnly cookie scoped to path / with SameSite=Strict
    HeaderValue::from_str(&format!("{}={}; HttpOnly; Secure; SameSite=Strict; Path=/", SESSION_COOKIE, token)).unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!("{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict; Path=/", SESSION_COOKIE)).unwrap()
}

/// Map a backend failure to its wire error and HTTP status.
fn backend_error(e: &ApiError, code: &str) -> (StatusCode, serde_json::Value) {
    let msg = user_friendly_message(&e.to_string());
    let app = match e {
        ApiError::Status(401) | ApiError::Status(403) => AppError::auth(code.to_string(), msg),
        ApiError::Status(404) => AppError::not_found(code.to_string(), msg),
        ApiError::Status(_) => AppError::upstream(code.to_string(), msg),
        ApiError::Network(_) => AppError::io(code.to_string(), msg),
        ApiError::Message(_) => AppError::internal(code.to_string(), msg),
    };
    let status = StatusCode::from_u16(app.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, json!({"status": "error", "error": app}))
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> impl IntoResponse {
    let credentials = Credentials { email: payload.email.clone(), password: payload.password };
    match state.backend.login(&credentials).await {
        Ok(resp) => {
            // Identity and role come from the token payload; undecodable
            // payloads degrade to the default role with the typed-in email.
            let role = role_from_token(Some(&resp.access_token));
            let (user_id, email) = match decode_jwt(&resp.access_token) {
                Some(claims) => (claims.id.to_string(), claims.email),
                None => (payload.email.clone(), payload.email),
            };
            let principal = Principal { user_id, email, role, attrs: Default::default() };
            let session = state.sessions.issue(principal);
            let mut headers = HeaderMap::new();
            headers.insert("Set-Cookie", set_session_cookie(&session.token));
            let body = json!({
                "status": "ok",
                "access_token": resp.access_token,
                "role": role.label(),
                "expires_in": session.remaining().as_secs(),
            });
            (StatusCode::OK, headers, Json(body))
        }
        Err(e) => {
            error!("login failed: {e}");
            let (status, body) = backend_error(&e, "login_failed");
            (status, HeaderMap::new(), Json(body))
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = parse_cookie(&headers, SESSION_COOKIE) {
        state.sessions.logout(&token);
        state.forms.write().await.remove(&token);
    }
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_session_cookie());
    (StatusCode::OK, h, Json(json!({"status": "ok"})))
}

async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    match state.backend.reset_password(&payload).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(e) => {
            error!("reset-password failed: {e}");
            let (status, body) = backend_error(&e, "reset_failed");
            (status, Json(body))
        }
    }
}

async fn profile_completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProfilePayload>,
) -> impl IntoResponse {
    let Some((_token, principal)) = session_principal(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    };
    match state.backend.complete_profile(&payload).await {
        Ok(()) => {
            info!(target: "claimgate", "profile completed user={}", principal.user_id);
            (StatusCode::OK, Json(json!({"status": "ok"})))
        }
        Err(e) => {
            error!("profile-completion failed: {e}");
            let (status, body) = backend_error(&e, "profile_completion_failed");
            (status, Json(body))
        }
    }
}

async fn claim_handlers(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if session_principal(&state, &headers).is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    }
    match state.backend.get_claim_handlers().await {
        Ok(handlers) => (StatusCode::OK, Json(json!({"status": "ok", "claim_handlers": handlers}))),
        Err(e) => {
            error!("claim-handlers fetch failed: {e}");
            let (status, body) = backend_error(&e, "claim_handlers_failed");
            (status, Json(body))
        }
    }
}

#[derive(Debug, Deserialize)]
struct GuardQuery {
    path: String,
    /// Optional required-role label for role-gated pages; when present the
    /// decision goes through `protected_route` instead of the plain guard.
    #[serde(default)]
    role: Option<String>,
}

/// Evaluate the route guard for a navigation, from the caller's session state.
/// The server never reports `loading`; auth state here is always settled.
async fn guard_decision(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<GuardQuery>,
) -> impl IntoResponse {
    let token = parse_cookie(&headers, SESSION_COOKIE);
    let principal = token.as_deref().and_then(|t| state.sessions.validate(t));
    let auth = AuthState {
        is_authenticated: principal.is_some(),
        is_loading: false,
        user: principal.map(|p| AuthUser {
            id: p.user_id.parse().unwrap_or(0),
            email: p.email,
            role: p.role,
        }),
        error: None,
    };
    let decision = match q.role.as_deref() {
        Some(label) => {
            let Some(required) = Role::from_label(label) else {
                let app = AppError::user("unknown_role".to_string(), format!("unknown role '{}'", label));
                return (StatusCode::BAD_REQUEST, Json(json!({"status": "error", "error": app})));
            };
            protected_route(&auth, Some(required))
        }
        None => route_guard(&auth, &q.path, token.is_some()),
    };
    let body = match decision {
        GuardDecision::Render => json!({"decision": "render"}),
        GuardDecision::Loading => json!({"decision": "loading"}),
        GuardDecision::Redirect(to) => json!({"decision": "redirect", "to": to}),
    };
    (StatusCode::OK, Json(body))
}

async fn intimation_snapshot(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some((token, _principal)) = session_principal(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    };
    let forms = state.forms.read().await;
    let form = forms.get(&token).cloned().unwrap_or_default();
    (StatusCode::OK, Json(json!({"status": "ok", "form": form})))
}

async fn intimation_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(action): Json<FormAction>,
) -> impl IntoResponse {
    let Some((token, _principal)) = session_principal(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    };
    let mut forms = state.forms.write().await;
    let form = forms.entry(token).or_default();
    form.apply(action);
    let dirty = form.has_unsaved_changes();
    (StatusCode::OK, Json(json!({
        "status": "ok",
        "form": form.clone(),
        "has_unsaved_changes": dirty,
    })))
}

async fn intimation_draft(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some((token, principal)) = session_principal(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    };
    let snapshot = {
        let mut forms = state.forms.write().await;
        let form = forms.entry(token.clone()).or_default();
        form.apply(FormAction::SetLoading { loading: true });
        form.clone()
    };
    let rid = uuid::Uuid::new_v4();
    info!(target: "intimation", "draft.save rid={} user={}", rid, principal.user_id);
    let outcome = state.backend.save_draft(&snapshot).await;
    let mut forms = state.forms.write().await;
    let form = forms.entry(token).or_default();
    form.apply(FormAction::SetLoading { loading: false });
    match outcome {
        Ok(receipt) => {
            form.apply(FormAction::SetDraftId { draft_id: Some(receipt.draft_id.clone()) });
            form.apply(FormAction::MarkDraftSaved);
            (StatusCode::OK, Json(json!({"status": "ok", "draft_id": receipt.draft_id})))
        }
        Err(e) => {
            // Local edits are kept as-is; the failure is surfaced, not rolled back.
            error!("draft.save rid={} failed: {}", rid, e);
            let (status, body) = backend_error(&e, "draft_save_failed");
            (status, Json(body))
        }
    }
}

async fn intimation_submit(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some((token, principal)) = session_principal(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "unauthorized"})));
    };
    let snapshot = {
        let mut forms = state.forms.write().await;
        let form = forms.entry(token.clone()).or_default();
        form.apply(FormAction::SetLoading { loading: true });
        form.clone()
    };
    let rid = uuid::Uuid::new_v4();
    info!(target: "intimation", "intimation.submit rid={} user={}", rid, principal.user_id);
    let outcome = state.backend.submit_intimation(&snapshot).await;
    let mut forms = state.forms.write().await;
    let form = forms.entry(token).or_default();
    form.apply(FormAction::SetLoading { loading: false });
    match outcome {
        Ok(receipt) => {
            form.apply(FormAction::SetReferenceId { reference_id: Some(receipt.reference_id.clone()) });
            (StatusCode::OK, Json(json!({"status": "ok", "reference_id": receipt.reference_id})))
        }
        Err(e) => {
            error!("intimation.submit rid={} failed: {}", rid, e);
            let (status, body) = backend_error(&e, "submit_failed");
            (status, Json(body))
        }
    }
}
