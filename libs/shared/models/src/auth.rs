use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub iat: Option<u64>,
}

/// Caller identity as asserted by the external session service. The core
/// trusts this and never re-verifies identity itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub email: Option<String>,
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Clinic,
    Admin,
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(UserRole::Patient),
            "clinic" => Some(UserRole::Clinic),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Patient => write!(f, "patient"),
            UserRole::Clinic => write!(f, "clinic"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}
