//! Server-rendered HTML pages.
//!
//! Templates are compiled into the binary and loaded once at startup. Every page extends
//! `layout.html`, which expects an optional `current_user` and an optional `error` message.

use std::sync::Arc;

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::errors::Result;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("contacts/list.html", include_str!("../templates/contacts/list.html")),
    ("contacts/form.html", include_str!("../templates/contacts/form.html")),
    ("users/list.html", include_str!("../templates/users/list.html")),
    ("users/form.html", include_str!("../templates/users/form.html")),
];

/// Shared handle to the template environment.
#[derive(Clone)]
pub struct Views {
    env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env: Arc::new(env) })
    }

    /// Render a template with a serializable context.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(context)?))
    }
}
