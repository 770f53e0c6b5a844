//! # phonebook: a small server-rendered contact manager
//!
//! `phonebook` keeps a shared list of contacts (name and phone number) and the user accounts that
//! may edit it. Everything is stored in a single SQLite database and served as plain HTML forms.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! [SQLx](https://github.com/launchbadge/sqlx) over SQLite for persistence.
//!
//! ### Core Components
//!
//! The **database layer** ([`db`]) creates the two tables on startup and exposes a repository per
//! table. Rows are never physically removed: deleting a user or a contact clears its `in_use`
//! flag and stamps who did it and when. Reads only ever see active rows unless they explicitly
//! ask for inactive ones.
//!
//! The **authentication layer** ([`auth`]) hashes passwords with Argon2id and issues signed,
//! expiring session tokens in an HTTP-only cookie. Every authenticated request re-checks that the
//! token's user is still active.
//!
//! The **HTTP layer** ([`api`]) maps routes to handlers, which talk to the repositories and render
//! [`views`] or redirect.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use phonebook::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = phonebook::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     phonebook::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;
pub mod views;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::handlers::{auth as auth_handlers, contacts, healthz, users},
    auth::password::{self, Argon2Params},
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
    views::Views,
};
use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};

pub use types::{ContactId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .views(Views::new()?)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub views: Views,
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the user if no active user has this name, otherwise resets its password.
/// The bootstrap user has no creator, so `inserted_by` stays null.
#[instrument(skip_all, fields(username = %username))]
pub async fn create_initial_admin_user(username: &str, password: &str, params: Argon2Params, db: &SqlitePool) -> Result<UserId, Error> {
    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let mut conn = db.acquire().await.map_err(DbError::from)?;
    let mut user_repo = Users::new(&mut conn);

    if let Some(existing_user) = user_repo.get_user_by_username(username).await? {
        user_repo.set_password_hash(existing_user.id, &password_hash).await?;
        info!("Reset password for administrator '{}'", username);
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
            inserted_by: None,
        })
        .await?;

    info!("Created administrator '{}'", username);
    Ok(created_user.id)
}

/// Open the database, ensure the schema and seed the administrator if a password is configured.
#[instrument(skip_all)]
pub async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let pool = db::connect(&config.database).await?;

    if let Some(admin_password) = config.admin_password.as_deref() {
        let params = Argon2Params::from(&config.auth.password);
        match create_initial_admin_user(&config.admin_username, admin_password, params, &pool).await {
            Ok(_) => {}
            // The name belongs to a deactivated user; leave it alone
            Err(Error::Database(DbError::DuplicateUsername { username })) => {
                warn!("Administrator '{}' exists but is deactivated, not seeding", username);
            }
            Err(e) => {
                pool.close().await;
                return Err(anyhow::anyhow!("Failed to seed administrator: {e}"));
            }
        }
    } else {
        debug!("No admin_password configured, skipping administrator seeding");
    }

    Ok(pool)
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        // Contacts; the list is public, everything else requires a session
        .route("/", get(contacts::list_contacts))
        .route("/contacts", get(contacts::list_contacts))
        .route("/contacts/new", get(contacts::new_contact_form))
        .route("/contacts/create", post(contacts::create_contact))
        .route("/contacts/edit", get(contacts::edit_contact_form))
        .route("/contacts/update", post(contacts::update_contact))
        .route("/contacts/delete", get(contacts::delete_contact).post(contacts::delete_contact))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/new", get(users::new_user_form))
        .route("/users/create", post(users::create_user))
        .route("/users/edit", get(users::edit_user_form))
        .route("/users/update", post(users::update_user))
        .route("/users/delete", get(users::delete_user).post(users::delete_user))
        // Sessions
        .route("/login", get(auth_handlers::login_form))
        .route("/dologin", post(auth_handlers::login))
        .route("/logout", get(auth_handlers::logout))
        .route("/healthz", get(healthz))
        .nest_service("/static", static_files)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] opens the database, ensures the schema, seeds the
///    administrator and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish and the pool
///    is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting phonebook with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        let views = Views::new()?;

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).views(views).build();
        let router = build_router(app_state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, SqlitePool) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.pool)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Phonebook listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
