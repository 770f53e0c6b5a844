//! Shared helpers for tests: in-memory databases, a fast test configuration, seeded users and a
//! ready-to-use test server.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{
        password::{self, Argon2Params},
        session,
    },
    build_router,
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
        schema,
    },
    views::Views,
};
use axum_test::TestServer;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

/// Cheap Argon2 parameters so tests don't spend seconds hashing
pub fn fast_argon2_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// A fresh in-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` is its own database, so the pool is pinned to a single
/// connection that is never recycled.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    schema::ensure_schema(&mut conn).await.expect("Failed to create schema");
    drop(conn);

    pool
}

/// Argon2id hash of `password` under [`fast_argon2_params`]
pub fn fast_hash(password: &str) -> String {
    password::hash_string_with_params(password, Some(fast_argon2_params())).expect("Failed to hash password")
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        secret_key: Some("test-secret-key-for-sessions".to_string()),
        ..Default::default()
    };
    config.database.pool.max_connections = 1;
    config.auth.session.cookie_secure = false;
    config.auth.password.argon2_memory_kib = 1024;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config
}

pub async fn create_test_user(pool: &SqlitePool, username: &str, password: &str) -> CurrentUser {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Users::new(&mut conn);

    let request = UserCreateDBRequest {
        username: username.to_string(),
        password_hash: fast_hash(password),
        inserted_by: None,
    };
    let user = repo.create(&request).await.expect("Failed to create test user");
    CurrentUser::from(user)
}

/// `Cookie` header value carrying a valid session for `user` under [`create_test_config`]
pub fn session_cookie_for(user: &CurrentUser) -> String {
    let config = create_test_config();
    let token = session::create_session_token(user, &config).expect("Failed to create session token");
    format!("{}={}", config.auth.session.cookie_name, token)
}

/// Router over a fresh in-memory database, plus the pool for seeding and assertions
pub async fn create_test_app() -> (TestServer, SqlitePool) {
    let pool = create_test_pool().await;
    let state = AppState::builder()
        .db(pool.clone())
        .config(create_test_config())
        .views(Views::new().expect("Failed to load templates"))
        .build();

    let server = TestServer::new(build_router(state)).expect("Failed to create test server");
    (server, pool)
}
