//! Table definitions and startup schema check.
//!
//! There is no migration system: both tables are created with `CREATE TABLE IF NOT EXISTS` on
//! every startup. A pre-existing table with a different shape is left as-is.

use sqlx::SqliteConnection;
use tracing::{info, instrument};

use crate::db::errors::Result;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    in_use INTEGER DEFAULT 1,
    inserted_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    inserted_by INTEGER,
    updated_at DATETIME,
    updated_by INTEGER
);
"#;

const CREATE_CONTACTS: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    in_use INTEGER DEFAULT 1,
    inserted_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    inserted_by INTEGER,
    updated_at DATETIME,
    updated_by INTEGER
);
"#;

/// Ensure the `users` and `contacts` tables exist. Idempotent.
#[instrument(skip_all, err)]
pub async fn ensure_schema(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(CREATE_USERS).execute(&mut *conn).await?;
    sqlx::query(CREATE_CONTACTS).execute(&mut *conn).await?;
    info!("Database schema ready");
    Ok(())
}
