use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

/// Access level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Sees every file and receives an alert for each processed file
    Admin,
    /// Sees only their own files
    Standard,
}

impl UserRole {
    /// Map the stored role name; anything but `ADMIN` is a standard user
    pub fn from_db(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case(ROLE_ADMIN) {
            Self::Admin
        } else {
            Self::Standard
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub role: UserRole,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Database row for users
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            role: UserRole::from_db(&row.role),
        }
    }
}
