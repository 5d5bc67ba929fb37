use serde::{Deserialize, Serialize};

/// Closed set of permission classes controlling route and page access.
/// Every authenticated session maps to exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    ClaimHandler,
    ClaimIntimation,
    Auditor,
    Admin,
}

impl Default for Role {
    fn default() -> Self { Role::ClaimIntimation }
}

impl Role {
    /// Map the backend's numeric role code. Unrecognized codes degrade to
    /// `ClaimIntimation` rather than failing.
    pub fn from_code(code: i64) -> Role {
        match code {
            1 => Role::ClaimHandler,
            2 => Role::ClaimIntimation,
            3 => Role::Auditor,
            4 => Role::Admin,
            _ => Role::ClaimIntimation,
        }
    }

    pub fn as_code(&self) -> i64 {
        match self {
            Role::ClaimHandler => 1,
            Role::ClaimIntimation => 2,
            Role::Auditor => 3,
            Role::Admin => 4,
        }
    }

    /// Inverse of `label`. Unknown labels are rejected rather than defaulted;
    /// a caller naming a required role must name a real one.
    pub fn from_label(label: &str) -> Option<Role> {
        match label {
            "claim-handler" => Some(Role::ClaimHandler),
            "claim-intimation" => Some(Role::ClaimIntimation),
            "auditor" => Some(Role::Auditor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::ClaimHandler => "claim-handler",
            Role::ClaimIntimation => "claim-intimation",
            Role::Auditor => "auditor",
            Role::Admin => "admin",
        }
    }
}
