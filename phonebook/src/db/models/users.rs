//! Database models for users.

use crate::types::UserId;
use chrono::NaiveDateTime;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub password_hash: String,
    /// `None` only for the bootstrap administrator, which has no acting user
    pub inserted_by: Option<UserId>,
}

/// Database request for updating a user
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub username: String,
    /// `None` keeps the stored hash
    pub password_hash: Option<String>,
    pub updated_by: UserId,
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub in_use: bool,
    pub inserted_at: NaiveDateTime,
    pub inserted_by: Option<UserId>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<UserId>,
}
