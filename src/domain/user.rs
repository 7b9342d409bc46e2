//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_activated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User creation data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_activated: bool,
}

/// Partial user update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_activated: Option<bool>,
}

/// In-memory user record that has not been persisted yet.
///
/// A draft without an `id` is inserted on save; a draft carrying an `id`
/// overwrites that record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub id: Option<i32>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_activated: bool,
}

impl UserDraft {
    /// Apply the fields present in `changes`
    pub fn apply(&mut self, changes: UpdateUser) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(password) = changes.password {
            self.password = password;
        }
        if let Some(is_activated) = changes.is_activated {
            self.is_activated = is_activated;
        }
    }
}

impl From<CreateUser> for UserDraft {
    fn from(input: CreateUser) -> Self {
        Self {
            id: None,
            username: input.username,
            email: input.email,
            password: input.password,
            is_activated: input.is_activated,
        }
    }
}

impl From<User> for UserDraft {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            username: user.username,
            email: user.email,
            password: user.password,
            is_activated: user.is_activated,
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_activated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_activated: user.is_activated,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
