//! HTTP request handlers, organized by resource.
//!
//! Each handler is responsible for:
//! - Form and query parsing
//! - Requiring a session via the [`CurrentUser`](crate::api::models::users::CurrentUser) extractor
//! - Calling the repositories in [`crate::db::handlers`]
//! - Rendering a page or redirecting with `303 See Other`
//!
//! # Handler Modules
//!
//! - [`auth`]: Login form, login, logout
//! - [`contacts`]: Contact list and search, create, edit, soft delete
//! - [`users`]: User list, create, edit, soft delete
//!
//! Handlers return [`crate::errors::Error`], which turns into a status code and a plain-text
//! message, or a redirect to `/login` when there is no valid session.

pub mod auth;
pub mod contacts;
pub mod users;

/// Liveness probe
pub async fn healthz() -> &'static str {
    "OK"
}
