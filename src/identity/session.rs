use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use base64::Engine;
use crate::tprintln;

use super::principal::Principal;

pub type SessionToken = String;

/// An authenticated portal session. Created on successful login, destroyed on
/// logout or expiry; the token doubles as the cookie value handed to the
/// browser.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub token: SessionToken,
    pub principal: Principal,
    pub issued_at: Instant,
    pub expires_at: Instant,
}

impl Session {
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

static SESSIONS: Lazy<RwLock<HashMap<String, Session>>> = Lazy::new(|| RwLock::new(HashMap::new()));
static USER_INDEX: Lazy<RwLock<HashMap<String, HashSet<String>>>> = Lazy::new(|| RwLock::new(HashMap::new()));
static REVOKED: Lazy<RwLock<HashSet<String>>> = Lazy::new(|| RwLock::new(HashSet::new()));

fn gen_id() -> String {
    // 256-bit random token base64url without padding. A failed RNG must not
    // produce a predictable credential, so abort instead.
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).expect("system rng unavailable");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

pub struct SessionManager {
    pub ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self { Self { ttl: Duration::from_secs(60 * 60) } }
}

impl SessionManager {
    pub fn issue(&self, principal: Principal) -> Session {
        let now = Instant::now();
        let sess = Session {
            session_id: gen_id(),
            token: gen_id(),
            principal: principal.clone(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        SESSIONS.write().insert(sess.token.clone(), sess.clone());
        USER_INDEX
            .write()
            .entry(principal.user_id.clone())
            .or_insert_with(HashSet::new)
            .insert(sess.token.clone());
        tprintln!(
            "session.issue user={} role={} sid={} ttl_secs={}",
            principal.user_id, principal.role.label(), sess.session_id, self.ttl.as_secs()
        );
        sess
    }

    /// Resolve a token to its principal. Expired entries are dropped lazily;
    /// revoked tokens stay dead even if re-inserted.
    pub fn validate(&self, token: &str) -> Option<Principal> {
        if REVOKED.read().contains(token) { return None; }
        let now = Instant::now();
        let mut expired = false;
        let out = {
            let map = SESSIONS.read();
            match map.get(token) {
                Some(sess) if sess.expires_at > now => Some(sess.principal.clone()),
                Some(_) => { expired = true; None }
                None => None,
            }
        };
        if expired {
            SESSIONS.write().remove(token);
        }
        out
    }

    pub fn logout(&self, token: &str) -> bool {
        let Some(sess) = SESSIONS.write().remove(token) else { return false; };
        let mut idx = USER_INDEX.write();
        if let Some(set) = idx.get_mut(&sess.principal.user_id) { set.remove(token); }
        REVOKED.write().insert(token.to_string());
        true
    }

    /// Kill every live session belonging to a user, e.g. on deactivation.
    /// Returns how many sessions were dropped; their tokens stay revoked.
    pub fn revoke_user(&self, user_id: &str) -> usize {
        let mut count = 0usize;
        if let Some(tokens) = USER_INDEX.write().remove(user_id) {
            let mut s = SESSIONS.write();
            let mut r = REVOKED.write();
            for t in tokens {
                if s.remove(&t).is_some() { count += 1; }
                r.insert(t);
            }
        }
        tprintln!("session.revoke user={} count={}", user_id, count);
        count
    }
}
