use axum::{
    Form,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;

use crate::{
    AppState,
    api::models::auth::LoginForm,
    auth::{current_user, session},
    db::errors::DbError,
    errors::Error,
};

/// Show the login form
#[tracing::instrument(skip_all)]
pub async fn login_form(State(state): State<AppState>) -> Result<Html<String>, Error> {
    state.views.render("login.html", context! { username => "" })
}

/// Verify credentials and start a session.
///
/// On success the session cookie is set and the browser is sent to the contact list. On failure
/// the form is shown again with a 401 and no cookie.
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;

    let user = match current_user::authenticate(&mut pool_conn, &form.username, &form.password).await {
        Ok(user) => user,
        Err(Error::Unauthenticated { message }) => {
            tracing::info!("Failed login attempt");
            let page = state.views.render(
                "login.html",
                context! {
                    username => form.username.trim(),
                    error => message.unwrap_or_else(|| "Invalid credentials".to_string()),
                },
            )?;
            return Ok((StatusCode::UNAUTHORIZED, page).into_response());
        }
        Err(e) => return Err(e),
    };

    let token = session::create_session_token(&user, &state.config)?;
    let cookie = session::create_session_cookie(&token, &state.config);
    tracing::info!(user_id = user.id, "User logged in");

    Ok(([(SET_COOKIE, cookie)], Redirect::to("/contacts")).into_response())
}

/// Clear the session cookie
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = session::clear_session_cookie(&state.config);
    ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}
