use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Member,
}

/// Access token payload. `sub` and `group` are UUID strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub group: String,
    pub role: MemberRole,
    pub exp: usize,
    pub iat: usize,
}

/// The caller behind a verified token, scoped to one group.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub role: MemberRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}
