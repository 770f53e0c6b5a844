//! Common type definitions.
//!
//! Entity IDs are the SQLite `INTEGER PRIMARY KEY AUTOINCREMENT` values, wrapped in type aliases
//! so that signatures say which table an id belongs to:
//!
//! - [`UserId`]: User account identifier (also the actor id stamped into audit columns)
//! - [`ContactId`]: Contact identifier

// Type aliases for IDs
pub type UserId = i64;
pub type ContactId = i64;
