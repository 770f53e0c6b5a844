//! Request models for authentication.

use serde::{Deserialize, Serialize};

/// Form posted by the login page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
