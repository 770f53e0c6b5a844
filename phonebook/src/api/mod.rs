//! HTTP layer: request handlers and their data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Forms, query parameters and the view models passed to templates
//!
//! All pages are server-rendered HTML. Mutations are plain form posts answered with a redirect.

pub mod handlers;
pub mod models;
