//! Navigation gating over the portal's route surface.
//!
//! The route tables are fixed, enumerated lists; the guard itself performs no
//! network calls and never retries. Every mismatch resolves to an immediate
//! redirect decision.

use crate::identity::{AuthState, Role};

pub const LOGIN_ROUTE: &str = "/login";
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/login",
    "/sign-up",
    "/forgot-password",
    "/reset-password",
    "/email-verified",
];

/// Routes that only make sense while signed out.
pub const AUTH_ROUTES: &[&str] = &["/login", "/sign-up"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested page.
    Render,
    /// Auth state still resolving; show a placeholder.
    Loading,
    /// Navigate elsewhere instead.
    Redirect(&'static str),
}

/// Strip query/fragment and any trailing slash so `/reset-password?token=x`
/// matches the `/reset-password` table entry.
fn normalize(path: &str) -> &str {
    let p = path.split(['?', '#']).next().unwrap_or(path);
    let p = if p.len() > 1 { p.trim_end_matches('/') } else { p };
    if p.is_empty() { "/" } else { p }
}

pub fn is_public_route(path: &str) -> bool {
    let p = normalize(path);
    PUBLIC_ROUTES.contains(&p)
}

pub fn is_auth_route(path: &str) -> bool {
    let p = normalize(path);
    AUTH_ROUTES.contains(&p)
}

/// Gate a navigation. Evaluated on every navigation and every auth-state
/// change. `has_cached_token` suppresses the loading placeholder on public
/// routes for first-time visitors, who cannot possibly restore a session.
pub fn route_guard(auth: &AuthState, path: &str, has_cached_token: bool) -> GuardDecision {
    let p = normalize(path);
    if auth.is_loading && !(is_public_route(p) && !has_cached_token) {
        return GuardDecision::Loading;
    }
    if !auth.is_authenticated {
        if is_public_route(p) {
            return GuardDecision::Render;
        }
        return GuardDecision::Redirect(LOGIN_ROUTE);
    }
    if is_auth_route(p) || p == "/" {
        return GuardDecision::Redirect(DASHBOARD_ROUTE);
    }
    GuardDecision::Render
}

/// Per-page gate with an optional role requirement. A role mismatch bounces
/// to the dashboard rather than the login page: the caller is signed in, just
/// not allowed here.
pub fn protected_route(auth: &AuthState, required_role: Option<Role>) -> GuardDecision {
    if auth.is_loading {
        return GuardDecision::Loading;
    }
    if !auth.is_authenticated {
        return GuardDecision::Redirect(LOGIN_ROUTE);
    }
    match required_role {
        None => GuardDecision::Render,
        Some(required) => match &auth.user {
            Some(user) if user.role == required => GuardDecision::Render,
            _ => GuardDecision::Redirect(DASHBOARD_ROUTE),
        },
    }
}
