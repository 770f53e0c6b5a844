//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (HTTP request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//! - [`schema`]: Table definitions, applied on startup
//!
//! # Connections
//!
//! The pool is opened once by [`connect`] and handed to everything that needs it; repositories
//! borrow a single connection for their lifetime:
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let mut repo = Contacts::new(&mut conn);
//! let contacts = repo.list(&ContactFilter::search("ali")).await?;
//! ```
//!
//! Every statement is auto-committed on its own. Uniqueness of usernames is enforced by the
//! table constraint rather than by a read-then-write check.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use crate::config::DatabaseConfig;

/// Convert seconds to an optional duration, with 0 meaning "never"
fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Open the connection pool and make sure the schema exists.
///
/// Any failure here is fatal for the process: the server must not start against a missing schema.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(config.create_if_missing);
    let settings = &config.pool;

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(optional_secs(settings.idle_timeout_secs))
        .max_lifetime(optional_secs(settings.max_lifetime_secs))
        .connect_with(options)
        .await?;

    let mut conn = pool.acquire().await?;
    schema::ensure_schema(&mut conn).await?;
    drop(conn);

    info!("Connected to database at {}", config.url);
    Ok(pool)
}
