//! Request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::errors::Error;
use crate::types::UserId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Form posted by the new-user and edit-user pages.
///
/// `id` is only present on edits. An empty `password` on edit keeps the current password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl UserForm {
    /// The username as it is stored: trimmed, and required.
    pub fn validated_username(&self) -> Result<String, Error> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(Error::BadRequest {
                message: "Username is required".to_string(),
            });
        }
        Ok(username.to_string())
    }
}

/// User as shown in listings and edit forms. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub in_use: bool,
    pub inserted_at: NaiveDateTime,
    pub inserted_by: Option<UserId>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<UserId>,
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            in_use: db.in_use,
            inserted_at: db.inserted_at,
            inserted_by: db.inserted_by,
            updated_at: db.updated_at,
            updated_by: db.updated_by,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str) -> UserForm {
        UserForm {
            id: None,
            username: username.to_string(),
            password: String::new(),
        }
    }

    #[test]
    fn test_username_is_trimmed() {
        assert_eq!(form("  alice ").validated_username().unwrap(), "alice");
    }

    #[test]
    fn test_blank_username_rejected() {
        for username in ["", "   "] {
            assert!(matches!(form(username).validated_username(), Err(Error::BadRequest { .. })));
        }
    }
}
