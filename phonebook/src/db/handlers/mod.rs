//! Repository implementations for database access.
//!
//! This module provides a repository struct for each table. Repositories follow a consistent
//! pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a borrowed SQLx connection
//! - Provides strongly-typed CRUD operations
//! - Binds every value as a query parameter
//! - Returns domain models from [`crate::db::models`]
//! - Soft-deletes instead of removing rows
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts, login lookup, administrator seeding
//! - [`Contacts`]: Phonebook entries and search
//!
//! # Common Pattern
//!
//! ```ignore
//! use phonebook::db::handlers::{Repository, Users, users::UserFilter};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Users::new(&mut conn);
//!
//!     let users = repo.list(&UserFilter::active()).await?;
//!     Ok(())
//! }
//! ```

pub mod contacts;
pub mod repository;
pub mod users;

pub use contacts::Contacts;
pub use repository::Repository;
pub use users::Users;
