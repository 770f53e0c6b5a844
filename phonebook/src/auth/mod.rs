//! Authentication.
//!
//! Browser sessions only: users log in via `/dologin` with username and password, and receive a
//! signed, expiring JWT in an HTTP-only cookie. Every request that needs an identity re-checks
//! the token *and* that the user is still active, so deactivating a user ends their sessions.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Session token and cookie handling
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use phonebook::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.username)
//! }
//! ```
//!
//! A handler taking [`CurrentUser`](crate::api::models::users::CurrentUser) redirects anonymous
//! visitors to `/login`. Use [`current_user::MaybeCurrentUser`] for pages that render either way.

pub mod current_user;
pub mod password;
pub mod session;
