//! Request/response models for contacts.

use crate::db::models::contacts::ContactDBResponse;
use crate::types::{ContactId, UserId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Form posted by the new-contact and edit-contact pages. `id` is only present on edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Query parameters for the contact list
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListContactsQuery {
    /// Substring matched against name or phone
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub in_use: bool,
    pub inserted_at: NaiveDateTime,
    pub inserted_by: Option<UserId>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<UserId>,
}

impl From<ContactDBResponse> for ContactResponse {
    fn from(db: ContactDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            phone: db.phone,
            in_use: db.in_use,
            inserted_at: db.inserted_at,
            inserted_by: db.inserted_by,
            updated_at: db.updated_at,
            updated_by: db.updated_by,
        }
    }
}
