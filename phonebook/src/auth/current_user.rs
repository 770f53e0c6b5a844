use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{password, session},
    config::Config,
    db::handlers::{Repository, Users},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::SqliteConnection;
use tracing::{debug, instrument, trace};

/// Extract the session token from the request's `Cookie` header, if any.
///
/// A header that is not valid UTF-8 carries no usable session.
fn session_cookie<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let Ok(cookie_str) = cookie_header.to_str() else {
        trace!("Ignoring Cookie header that is not valid UTF-8");
        return None;
    };

    cookie_str
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Resolve a session token to the user it belongs to.
///
/// Returns:
/// - `Ok(Some(user))`: signature and expiry check out, and the user is still active
/// - `Ok(None)`: the token is invalid or expired, or the user is missing or deactivated
/// - `Err(_)`: the lookup itself failed
#[instrument(skip_all, err)]
pub async fn resolve_session(conn: &mut SqliteConnection, config: &Config, token: &str) -> Result<Option<CurrentUser>> {
    let claims = match session::verify_session_token(token, config) {
        Ok(claims) => claims,
        Err(Error::Unauthenticated { .. }) => {
            trace!("Session token rejected");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let mut users = Users::new(conn);
    let user = users.get_by_id(claims.sub).await?;
    if user.is_none() {
        debug!("Session for user {} no longer maps to an active user", claims.sub);
    }
    Ok(user.map(CurrentUser::from))
}

/// Check a username and password against the active users.
///
/// Returns the user on success and `Unauthenticated` on any mismatch, without revealing whether
/// the username exists. Verification runs on the blocking pool.
#[instrument(skip(conn, password), err)]
pub async fn authenticate(conn: &mut SqliteConnection, username: &str, password: &str) -> Result<CurrentUser> {
    let invalid = || Error::Unauthenticated {
        message: Some("Invalid username or password".to_string()),
    };

    let mut users = Users::new(conn);
    let user = users.get_user_by_username(username.trim()).await?;

    // Unknown users are checked against a hash nothing matches, so both failures take as long
    let password = password.to_string();
    let password_hash = user
        .as_ref()
        .map_or_else(|| password::UNMATCHABLE_HASH.to_string(), |u| u.password_hash.clone());
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?;

    match user {
        Some(user) if is_valid => Ok(CurrentUser::from(user)),
        _ => Err(invalid()),
    }
}

async fn current_user_from_parts(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>> {
    let Some(token) = session_cookie(parts, &state.config.auth.session.cookie_name) else {
        trace!("No session cookie found in request");
        return Ok(None);
    };

    let mut conn = state.db.acquire().await.map_err(crate::db::errors::DbError::from)?;
    resolve_session(&mut conn, &state.config, token).await
}

/// Requires an authenticated user. Rejects with [`Error::Unauthenticated`], which redirects the
/// browser to the login page.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match current_user_from_parts(parts, state).await? {
            Some(user) => {
                debug!("Found session authenticated user: {}", user.id);
                Ok(user)
            }
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

/// Optional identity, for pages that also render for anonymous visitors.
#[derive(Debug, Clone)]
pub struct MaybeCurrentUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeCurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        Ok(MaybeCurrentUser(current_user_from_parts(parts, state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_pool, create_test_user};
    use axum::http::{HeaderValue, Request};

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header(axum::http::header::COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_session_cookie_extraction() {
        let parts = parts_with_cookie(Some("other=1; phonebook_session=abc.def.ghi; theme=dark"));
        assert_eq!(session_cookie(&parts, "phonebook_session"), Some("abc.def.ghi"));

        let parts = parts_with_cookie(Some("other=1"));
        assert_eq!(session_cookie(&parts, "phonebook_session"), None);

        let parts = parts_with_cookie(Some("phonebook_session="));
        assert_eq!(session_cookie(&parts, "phonebook_session"), None);

        let parts = parts_with_cookie(None);
        assert_eq!(session_cookie(&parts, "phonebook_session"), None);
    }

    #[test]
    fn test_non_utf8_cookie_header_is_no_session() {
        let value = HeaderValue::from_bytes(b"other=\xe9t\xe9; phonebook_session=abc.def.ghi").unwrap();
        let parts = Request::builder()
            .uri("/")
            .header(axum::http::header::COOKIE, value)
            .body(())
            .unwrap()
            .into_parts()
            .0;
        assert_eq!(session_cookie(&parts, "phonebook_session"), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_session_for_active_user() {
        let pool = create_test_pool().await;
        let config = create_test_config();
        let user = create_test_user(&pool, "alice", "secret1").await;
        let token = session::create_session_token(&user, &config).unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let resolved = resolve_session(&mut conn, &config, &token).await.unwrap();
        assert_eq!(resolved, Some(user));
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_session_after_soft_delete() {
        let pool = create_test_pool().await;
        let config = create_test_config();
        let user = create_test_user(&pool, "alice", "secret1").await;
        let token = session::create_session_token(&user, &config).unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(Users::new(&mut conn).delete(user.id, user.id).await.unwrap());

        let resolved = resolve_session(&mut conn, &config, &token).await.unwrap();
        assert_eq!(resolved, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_resolve_session_rejects_non_tokens() {
        let pool = create_test_pool().await;
        let config = create_test_config();
        let user = create_test_user(&pool, "alice", "secret1").await;

        let mut conn = pool.acquire().await.unwrap();
        // A bare user id is not a session
        let bare_id = user.id.to_string();
        for token in [bare_id.as_str(), "garbage", "a.b.c"] {
            assert_eq!(resolve_session(&mut conn, &config, token).await.unwrap(), None);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_authenticate() {
        let pool = create_test_pool().await;
        let user = create_test_user(&pool, "admin", "secret").await;
        let mut conn = pool.acquire().await.unwrap();

        let authenticated = authenticate(&mut conn, "admin", "secret").await.unwrap();
        assert_eq!(authenticated, user);

        assert!(matches!(
            authenticate(&mut conn, "admin", "wrong").await,
            Err(Error::Unauthenticated { .. })
        ));
        assert!(matches!(
            authenticate(&mut conn, "nobody", "secret").await,
            Err(Error::Unauthenticated { .. })
        ));

        Users::new(&mut conn).delete(user.id, user.id).await.unwrap();
        assert!(matches!(
            authenticate(&mut conn, "admin", "secret").await,
            Err(Error::Unauthenticated { .. })
        ));
    }
}
