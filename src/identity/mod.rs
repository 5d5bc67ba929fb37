//! Central identity and session management for the claims portal.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod provider;
mod role;
mod session;
mod store;
mod token;

pub use principal::{Attrs, Principal};
pub use provider::{AuthProvider, AuthState, AuthUser};
pub use role::Role;
pub use session::{Session, SessionManager, SessionToken};
pub use store::{TokenStore, ACCESS_TOKEN_KEY, PROFILE_COMPLETION_USER_KEY};
pub use token::{decode_jwt, role_from_token, TokenClaims};
