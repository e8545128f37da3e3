//! User model matching the frontend auth contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user, as exposed over the API (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Internal user row including the stored password hash.
///
/// Never serialized; used only for credential verification during login.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_user(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            username: self.username,
            created_at: self.created_at,
        }
    }
}

/// Request body for POST /api/users/signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

/// Request body for POST /api/users/login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response payload for a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: User,
}
