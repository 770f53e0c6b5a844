use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// No active row matches the given identifier
    #[error("Entity not found")]
    NotFound,

    /// The `users.username` uniqueness constraint rejected a write
    #[error("Username '{username}' is already taken")]
    DuplicateUsername { username: String },

    /// Any other unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        table: Option<String>,
        column: Option<String>,
        message: String,
    },

    /// Catch-all for non-recoverable errors (connectivity, malformed SQL, other constraints)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// Re-tag a unique violation on `users.username` as [`DbError::DuplicateUsername`].
    pub(crate) fn for_username(self, username: &str) -> Self {
        match self {
            DbError::UniqueViolation {
                table: Some(ref table),
                column: Some(ref column),
                ..
            } if table == "users" && column == "username" => DbError::DuplicateUsername {
                username: username.to_string(),
            },
            other => other,
        }
    }
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                // SQLite reports neither table nor constraint name, only the message:
                // "UNIQUE constraint failed: users.username"
                let (table, column) = parse_unique_target(db_err.message());
                DbError::UniqueViolation {
                    table: db_err.table().map(|s| s.to_string()).or(table),
                    column,
                    message: db_err.message().to_string(),
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Extract `(table, column)` from a SQLite unique violation message.
fn parse_unique_target(message: &str) -> (Option<String>, Option<String>) {
    let Some((_, target)) = message.split_once("constraint failed: ") else {
        return (None, None);
    };
    // Composite constraints list several "table.column" pairs; the first names the table
    let first = target.split(',').next().unwrap_or(target).trim();
    match first.split_once('.') {
        Some((table, column)) => (Some(table.to_string()), Some(column.to_string())),
        None => (None, None),
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
