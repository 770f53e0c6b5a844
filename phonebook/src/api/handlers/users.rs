use axum::{
    Form,
    extract::{Query, State},
    response::{Html, Redirect},
};
use minijinja::context;

use crate::{
    AppState,
    api::models::{
        IdQuery, parse_id,
        users::{CurrentUser, UserForm, UserResponse},
    },
    auth::password::{self, Argon2Params},
    config::PasswordConfig,
    db::{
        errors::DbError,
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    types::UserId,
};

/// Check a new password against the configured length bounds
fn validate_password(password: &str, config: &PasswordConfig) -> Result<(), Error> {
    if password.len() < config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", config.min_length),
        });
    }
    if password.len() > config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", config.max_length),
        });
    }
    Ok(())
}

fn user_not_found(id: UserId) -> Error {
    Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    }
}

/// Hash a password on the blocking pool
async fn hash_off_thread(password: String, params: Argon2Params) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, current_user: CurrentUser) -> Result<Html<String>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut pool_conn);

    let users: Vec<UserResponse> = repo
        .list(&UserFilter::active())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    state.views.render("users/list.html", context! { current_user, users })
}

#[tracing::instrument(skip_all)]
pub async fn new_user_form(State(state): State<AppState>, current_user: CurrentUser) -> Result<Html<String>, Error> {
    state.views.render("users/form.html", context! { current_user })
}

#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<UserForm>,
) -> Result<Redirect, Error> {
    let username = form.validated_username()?;
    validate_password(&form.password, &state.config.auth.password)?;

    let params = Argon2Params::from(&state.config.auth.password);
    let actor = current_user.id;
    let request = UserCreateDBRequest {
        username,
        password_hash: hash_off_thread(form.password, params).await?,
        inserted_by: Some(actor),
    };

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut pool_conn);
    let user = repo.create(&request).await?;

    tracing::info!(new_user_id = user.id, user_id = actor, "User created");
    Ok(Redirect::to("/users"))
}

#[tracing::instrument(skip_all)]
pub async fn edit_user_form(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<IdQuery>,
) -> Result<Html<String>, Error> {
    let id = parse_id(query.id.as_deref())?;

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut pool_conn);
    let user = repo.get_by_id(id).await?.ok_or_else(|| user_not_found(id))?;

    state.views.render(
        "users/form.html",
        context! { current_user, user => UserResponse::from(user) },
    )
}

/// Update username and, when one is given, the password
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<UserForm>,
) -> Result<Redirect, Error> {
    let id = parse_id(form.id.as_deref())?;
    let username = form.validated_username()?;

    // An empty password keeps the stored one
    let password_hash = if form.password.is_empty() {
        None
    } else {
        validate_password(&form.password, &state.config.auth.password)?;
        let params = Argon2Params::from(&state.config.auth.password);
        Some(hash_off_thread(form.password, params).await?)
    };

    let actor = current_user.id;
    let request = UserUpdateDBRequest {
        username,
        password_hash,
        updated_by: actor,
    };

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut pool_conn);
    match repo.update(id, &request).await {
        Ok(_) => {}
        Err(DbError::NotFound) => return Err(user_not_found(id)),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(target_user_id = id, user_id = actor, "User updated");
    Ok(Redirect::to("/users"))
}

#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<IdQuery>,
) -> Result<Redirect, Error> {
    let id = parse_id(query.id.as_deref())?;

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Users::new(&mut pool_conn);
    if repo.delete(id, current_user.id).await? {
        tracing::info!(target_user_id = id, user_id = current_user.id, "User deactivated");
    } else {
        tracing::debug!(target_user_id = id, "No active user to delete");
    }

    Ok(Redirect::to("/users"))
}
