//! Auth state container: holds the caller's identity and drives the
//! login/logout/reset flows against the external claims backend.
//!
//! Lifecycle is explicit rather than ambient: construct with
//! [`AuthProvider::new`], call [`AuthProvider::restore`] once at startup to
//! attempt a silent restore from the token store, and [`AuthProvider::logout`]
//! to tear down. Concurrent in-flight calls are not deduplicated; that is the
//! caller's responsibility.

use crate::client::{BackendApi, Credentials, ResetPasswordRequest};
use crate::error::user_friendly_message;
use crate::tprintln;

use super::role::Role;
use super::store::TokenStore;
use super::token::decode_jwt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<AuthUser>,
    pub error: Option<String>,
}

pub struct AuthProvider<A: BackendApi> {
    api: A,
    store: TokenStore,
    pub state: AuthState,
}

impl<A: BackendApi> AuthProvider<A> {
    pub fn new(api: A, store: TokenStore) -> Self {
        Self { api, store, state: AuthState::default() }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Attempt a silent restore from a previously stored token. Expired or
    /// undecodable tokens are discarded and leave the state unauthenticated.
    pub fn restore(&mut self) {
        let Some(token) = self.store.access_token() else { return; };
        let now = chrono::Utc::now().timestamp();
        match decode_jwt(&token) {
            Some(claims) if !claims.is_expired(now) => {
                self.state.user = Some(AuthUser {
                    id: claims.id,
                    email: claims.email.clone(),
                    role: claims.role(),
                });
                self.state.is_authenticated = true;
            }
            _ => {
                tprintln!("auth.restore discarding stale token");
                self.store.clear_access_token();
            }
        }
    }

    /// Log in against the backend. On success the token is stored and the
    /// state flips to authenticated; on failure the state keeps
    /// `is_authenticated=false` and carries a user-facing error message.
    pub async fn login(&mut self, credentials: &Credentials) -> bool {
        self.state.is_loading = true;
        self.state.error = None;
        let outcome = self.api.login(credentials).await;
        self.state.is_loading = false;
        match outcome {
            Ok(resp) => {
                if let Err(e) = self.store.set_access_token(&resp.access_token) {
                    self.state.error = Some(user_friendly_message(&e.to_string()));
                    return false;
                }
                let user = match decode_jwt(&resp.access_token) {
                    Some(claims) => AuthUser {
                        id: claims.id,
                        email: claims.email.clone(),
                        role: claims.role(),
                    },
                    // Undecodable payloads still authenticate, with the
                    // default role and the typed-in email as identity.
                    None => AuthUser { id: 0, email: credentials.email.clone(), role: Role::default() },
                };
                self.state.user = Some(user);
                self.state.is_authenticated = true;
                true
            }
            Err(e) => {
                self.state.is_authenticated = false;
                self.state.user = None;
                self.state.error = Some(user_friendly_message(&e.to_string()));
                false
            }
        }
    }

    /// Clear stored tokens and reset the state. Succeeds locally without any
    /// server round-trip.
    pub fn logout(&mut self) {
        self.store.clear_access_token();
        self.store.clear_pending_profile_user();
        self.state = AuthState::default();
    }

    /// Forward a password reset to the backend. Returns whether it succeeded;
    /// failures surface through `state.error`.
    pub async fn reset_password(&mut self, token: &str, password: &str) -> bool {
        self.state.is_loading = true;
        self.state.error = None;
        let req = ResetPasswordRequest { token: token.to_string(), password: password.to_string() };
        let outcome = self.api.reset_password(&req).await;
        self.state.is_loading = false;
        match outcome {
            Ok(()) => true,
            Err(e) => {
                self.state.error = Some(user_friendly_message(&e.to_string()));
                false
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }
}
