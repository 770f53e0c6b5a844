//! JWT session token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{api::models::users::CurrentUser, config::Config, errors::Error, types::UserId};

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,      // Subject (user ID)
    pub username: String, // Username at login time
    pub exp: i64,         // Expiration time
    pub iat: i64,         // Issued at
}

impl SessionClaims {
    /// Create new session claims for a user
    pub fn new(user: &CurrentUser, config: &Config) -> Self {
        let now = Utc::now();
        let lifetime = chrono::Duration::from_std(config.auth.session.timeout).unwrap_or(chrono::Duration::hours(24));
        let exp = now + lifetime;

        Self {
            sub: user.id,
            username: user.username.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

fn secret_key(config: &Config) -> Result<&[u8], Error> {
    config
        .secret_key
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::as_bytes)
        .ok_or_else(|| Error::Internal {
            operation: "JWT sessions: secret_key is required".to_string(),
        })
}

/// Create a JWT token for a user session
pub fn create_session_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, config);
    let key = EncodingKey::from_secret(secret_key(config)?);
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode a JWT session token.
///
/// This only checks the signature and expiry. Whether the user still exists and is active is
/// decided by [`crate::auth::current_user::resolve_session`].
pub fn verify_session_token(token: &str, config: &Config) -> Result<SessionClaims, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?);
    let validation = Validation::default();

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidKeyFormat | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        _ => Error::Unauthenticated { message: None },
    })?;

    Ok(token_data.claims)
}

/// `Set-Cookie` value carrying a freshly issued session token
pub fn create_session_cookie(token: &str, config: &Config) -> String {
    let session_config = &config.auth.session;
    let max_age = session_config.timeout.as_secs();
    let secure = if session_config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        session_config.cookie_name, token, secure, session_config.cookie_same_site, max_age
    )
}

/// `Set-Cookie` value that expires the session cookie immediately
pub fn clear_session_cookie(config: &Config) -> String {
    let session_config = &config.auth.session;
    let secure = if session_config.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}=; Path=/; HttpOnly{}; SameSite={}; Max-Age=0",
        session_config.cookie_name, secure, session_config.cookie_same_site
    )
}
