//! Database record models matching table schemas.
//!
//! These models are used by repositories to accept insertion/update data and to return query
//! results. Database models are distinct from the API models in [`crate::api::models`] so that
//! storage and presentation can evolve independently; in particular the password hash never
//! leaves this layer except for login verification.
//!
//! - [`users`]: User accounts and credentials
//! - [`contacts`]: Phonebook entries

pub mod contacts;
pub mod users;
