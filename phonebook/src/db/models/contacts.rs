//! Database models for contacts.

use crate::types::{ContactId, UserId};
use chrono::NaiveDateTime;

/// Database request for creating a new contact
#[derive(Debug, Clone)]
pub struct ContactCreateDBRequest {
    pub name: String,
    pub phone: String,
    pub inserted_by: UserId,
}

/// Database request for updating a contact
#[derive(Debug, Clone)]
pub struct ContactUpdateDBRequest {
    pub name: String,
    pub phone: String,
    pub updated_by: UserId,
}

/// Database response for a contact
#[derive(Debug, Clone)]
pub struct ContactDBResponse {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub in_use: bool,
    pub inserted_at: NaiveDateTime,
    pub inserted_by: Option<UserId>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<UserId>,
}
