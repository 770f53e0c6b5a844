//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PHONEBOOK_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PHONEBOOK_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PHONEBOOK_AUTH__SESSION__COOKIE_SECURE=false` sets the `auth.session.cookie_secure` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! PHONEBOOK_PORT=8080
//!
//! # Point at a different SQLite file
//! DATABASE_URL="sqlite:///var/lib/phonebook/phonebook.db"
//!
//! # Secrets
//! PHONEBOOK_SECRET_KEY="..."
//! PHONEBOOK_ADMIN_PASSWORD="..."
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PHONEBOOK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Set from the raw `DATABASE_URL` environment variable; folded into `database.url` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// SQLite database configuration
    pub database: DatabaseConfig,
    /// Username of the initial administrator (seeded on startup)
    pub admin_username: String,
    /// Password for the initial administrator. When set, the account is created if missing and
    /// its password is reset on every startup.
    pub admin_password: Option<String>,
    /// Secret key for signing session tokens (required)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Directory served under `/static`
    pub static_dir: String,
}

/// SQLite database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite://phonebook.db` or `sqlite::memory:`
    pub url: String,
    /// Create the database file if it does not exist
    pub create_if_missing: bool,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://phonebook.db".to_string(),
            create_if_missing: true,
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool configuration with the SQLx pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Password validation and hashing rules
    pub password: PasswordConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session lifetime; also the expiry embedded in the session token
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(24 * 60 * 60), // 24 hours
            cookie_name: "phonebook_session".to_string(),
            cookie_secure: true,
            cookie_same_site: "strict".to_string(),
        }
    }
}

/// Password validation rules and Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 64,
            // Secure defaults for production (Argon2id RFC recommendations)
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            database: DatabaseConfig::default(),
            admin_username: "admin".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            static_dir: "static".to_string(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Internal {
                operation: "Config validation: secret_key is not configured. \
                 Please set PHONEBOOK_SECRET_KEY environment variable or add secret_key to config file."
                    .to_string(),
            });
        }

        let password = &self.auth.password;
        if password.min_length > password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    password.min_length, password.max_length
                ),
            });
        }

        if password.argon2_memory_kib == 0 || password.argon2_iterations == 0 || password.argon2_parallelism == 0 {
            return Err(Error::Internal {
                operation: "Config validation: argon2 memory, iterations and parallelism must all be greater than 0".to_string(),
            });
        }

        if !matches!(self.auth.session.cookie_same_site.as_str(), "strict" | "lax" | "none") {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: cookie_same_site must be one of strict, lax or none (got '{}')",
                    self.auth.session.cookie_same_site
                ),
            });
        }

        if let Some(admin_password) = &self.admin_password
            && admin_password.len() < password.min_length
        {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: admin_password must be at least {} characters",
                    password.min_length
                ),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("PHONEBOOK_").split("__").ignore(&["config"]))
            // Common DATABASE_URL pattern
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
