//! Request and response models shared by the HTTP handlers and templates.
//!
//! - [`users`]: user forms, listings and the authenticated identity
//! - [`contacts`]: contact forms, search query and listings
//! - [`auth`]: login form

use serde::Deserialize;

use crate::errors::Error;

pub mod auth;
pub mod contacts;
pub mod users;

/// `?id=` query parameter used by the edit and delete routes.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// Parse a row id supplied by the browser.
pub fn parse_id(raw: Option<&str>) -> Result<i64, Error> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| Error::BadRequest {
        message: "Missing id".to_string(),
    })?;
    raw.parse().map_err(|_| Error::BadRequest {
        message: "Invalid id".to_string(),
    })
}
