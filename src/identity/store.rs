use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::tprintln;

/// Storage key for the backend access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for a signed-up user whose profile is not yet completed.
pub const PROFILE_COMPLETION_USER_KEY: &str = "profile_completion_user";

/// Small file-backed key/value store for per-user portal state, one file per
/// key under a root directory. Reads tolerate missing keys; removals tolerate
/// absent files.
#[derive(Debug, Clone)]
pub struct TokenStore {
    root: PathBuf,
}

impl TokenStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.kv", key))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let raw = std::fs::read_to_string(self.key_path(key)).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.key_path(key), value)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        let p = self.key_path(key);
        if p.exists() {
            if let Err(e) = std::fs::remove_file(&p) {
                tprintln!("store.remove key={} failed: {}", key, e);
            }
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, token)
    }

    pub fn clear_access_token(&self) {
        self.remove(ACCESS_TOKEN_KEY);
    }

    pub fn pending_profile_user(&self) -> Option<serde_json::Value> {
        self.get(PROFILE_COMPLETION_USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn set_pending_profile_user(&self, user: &serde_json::Value) -> Result<()> {
        self.set(PROFILE_COMPLETION_USER_KEY, &user.to_string())
    }

    pub fn clear_pending_profile_user(&self) {
        self.remove(PROFILE_COMPLETION_USER_KEY);
    }
}
