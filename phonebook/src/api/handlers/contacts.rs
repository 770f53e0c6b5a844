use axum::{
    Form,
    extract::{Query, State},
    response::{Html, Redirect},
};
use minijinja::context;

use crate::{
    AppState,
    api::models::{
        IdQuery,
        contacts::{ContactForm, ContactResponse, ListContactsQuery},
        parse_id,
        users::CurrentUser,
    },
    auth::current_user::MaybeCurrentUser,
    db::{
        errors::DbError,
        handlers::{Contacts, Repository, contacts::ContactFilter},
        models::contacts::{ContactCreateDBRequest, ContactUpdateDBRequest},
    },
    errors::Error,
    types::ContactId,
};

/// Name and phone are both required; surrounding whitespace is dropped.
fn validate_contact(form: &ContactForm) -> Result<(String, String), Error> {
    let name = form.name.trim();
    let phone = form.phone.trim();
    if name.is_empty() || phone.is_empty() {
        return Err(Error::BadRequest {
            message: "Name and phone are required".to_string(),
        });
    }
    Ok((name.to_string(), phone.to_string()))
}

fn contact_not_found(id: ContactId) -> Error {
    Error::NotFound {
        resource: "Contact".to_string(),
        id: id.to_string(),
    }
}

/// List active contacts, optionally filtered by `?q=`. Visible without logging in.
#[tracing::instrument(skip_all)]
pub async fn list_contacts(
    State(state): State<AppState>,
    MaybeCurrentUser(current_user): MaybeCurrentUser,
    Query(query): Query<ListContactsQuery>,
) -> Result<Html<String>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Contacts::new(&mut pool_conn);

    let search = query.q.unwrap_or_default();
    let contacts: Vec<ContactResponse> = repo
        .list(&ContactFilter::search(search.trim()))
        .await?
        .into_iter()
        .map(ContactResponse::from)
        .collect();

    state.views.render(
        "contacts/list.html",
        context! { current_user, contacts, query => search },
    )
}

#[tracing::instrument(skip_all)]
pub async fn new_contact_form(State(state): State<AppState>, current_user: CurrentUser) -> Result<Html<String>, Error> {
    state.views.render("contacts/form.html", context! { current_user })
}

#[tracing::instrument(skip_all)]
pub async fn create_contact(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<ContactForm>,
) -> Result<Redirect, Error> {
    let (name, phone) = validate_contact(&form)?;

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Contacts::new(&mut pool_conn);
    let contact = repo
        .create(&ContactCreateDBRequest {
            name,
            phone,
            inserted_by: current_user.id,
        })
        .await?;

    tracing::info!(contact_id = contact.id, user_id = current_user.id, "Contact created");
    Ok(Redirect::to("/contacts"))
}

#[tracing::instrument(skip_all)]
pub async fn edit_contact_form(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<IdQuery>,
) -> Result<Html<String>, Error> {
    let id = parse_id(query.id.as_deref())?;

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Contacts::new(&mut pool_conn);
    let contact = repo.get_by_id(id).await?.ok_or_else(|| contact_not_found(id))?;

    state.views.render(
        "contacts/form.html",
        context! { current_user, contact => ContactResponse::from(contact) },
    )
}

#[tracing::instrument(skip_all)]
pub async fn update_contact(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Form(form): Form<ContactForm>,
) -> Result<Redirect, Error> {
    let id = parse_id(form.id.as_deref())?;
    let (name, phone) = validate_contact(&form)?;

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Contacts::new(&mut pool_conn);
    let request = ContactUpdateDBRequest {
        name,
        phone,
        updated_by: current_user.id,
    };
    match repo.update(id, &request).await {
        Ok(_) => {}
        Err(DbError::NotFound) => return Err(contact_not_found(id)),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(contact_id = id, user_id = current_user.id, "Contact updated");
    Ok(Redirect::to("/contacts"))
}

#[tracing::instrument(skip_all)]
pub async fn delete_contact(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<IdQuery>,
) -> Result<Redirect, Error> {
    let id = parse_id(query.id.as_deref())?;

    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut repo = Contacts::new(&mut pool_conn);
    if repo.delete(id, current_user.id).await? {
        tracing::info!(contact_id = id, user_id = current_user.id, "Contact deleted");
    } else {
        tracing::debug!(contact_id = id, "No active contact to delete");
    }

    Ok(Redirect::to("/contacts"))
}

#[cfg(test)]
mod tests {
    use crate::db::handlers::{Contacts, Repository, contacts::ContactFilter};
    use crate::test_utils::{create_test_app, create_test_user, session_cookie_for};
    use axum::http::{HeaderValue, StatusCode, header::COOKIE};

    #[test_log::test(tokio::test)]
    async fn test_list_contacts_is_public() {
        let (server, _pool) = create_test_app().await;

        for path in ["/", "/contacts"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            assert!(response.text().contains("No contacts found"));
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_mutations_require_login() {
        let (server, _pool) = create_test_app().await;

        let response = server.get("/contacts/new").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        let response = server
            .post("/contacts/create")
            .form(&[("name", "Alice"), ("phone", "111")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        // A bare numeric cookie is not a session
        let response = server
            .get("/contacts/new")
            .add_header(COOKIE, "phonebook_session=1")
            .await;
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[test_log::test(tokio::test)]
    async fn test_non_utf8_cookie_is_treated_as_anonymous() {
        let (server, _pool) = create_test_app().await;
        let cookie = HeaderValue::from_bytes(b"other=\xe9t\xe9; phonebook_session=x").unwrap();

        let response = server.get("/contacts").add_header(COOKIE, cookie.clone()).await;
        response.assert_status_ok();
        assert!(response.text().contains("No contacts found"));

        let response = server.get("/contacts/new").add_header(COOKIE, cookie).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[test_log::test(tokio::test)]
    async fn test_contact_lifecycle() {
        let (server, pool) = create_test_app().await;
        let user = create_test_user(&pool, "admin", "secret").await;
        let cookie = session_cookie_for(&user);

        let response = server
            .post("/contacts/create")
            .add_header(COOKIE, cookie.clone())
            .form(&[("name", "Alice"), ("phone", "111")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/contacts");

        server
            .post("/contacts/create")
            .add_header(COOKIE, cookie.clone())
            .form(&[("name", "Bob"), ("phone", "222")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let response = server.get("/contacts").add_query_param("q", "ali").await;
        let body = response.text();
        assert!(body.contains("Alice"));
        assert!(!body.contains("Bob"));

        let alice = {
            let mut conn = pool.acquire().await.unwrap();
            let contacts = Contacts::new(&mut conn).list(&ContactFilter::search("Alice")).await.unwrap();
            assert_eq!(contacts[0].inserted_by, Some(user.id));
            contacts[0].clone()
        };

        let response = server
            .get("/contacts/edit")
            .add_query_param("id", alice.id)
            .add_header(COOKIE, cookie.clone())
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("value=\"Alice\""));

        let alice_id = alice.id.to_string();
        server
            .post("/contacts/update")
            .add_header(COOKIE, cookie.clone())
            .form(&[("id", alice_id.as_str()), ("name", "Alicia"), ("phone", "999")])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        server
            .post("/contacts/delete")
            .add_query_param("id", alice.id)
            .add_header(COOKIE, cookie.clone())
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);
        assert!(repo.get_by_id(alice.id).await.unwrap().is_none());
        let all = repo.list(&ContactFilter::default().with_inactive()).await.unwrap();
        let deleted = all.iter().find(|c| c.id == alice.id).unwrap();
        assert_eq!(deleted.name, "Alicia");
        assert_eq!(deleted.phone, "999");
        assert_eq!(deleted.updated_by, Some(user.id));
        assert!(!deleted.in_use);
    }

    #[test_log::test(tokio::test)]
    async fn test_edit_bad_ids() {
        let (server, pool) = create_test_app().await;
        let user = create_test_user(&pool, "admin", "secret").await;
        let cookie = session_cookie_for(&user);

        let response = server.get("/contacts/edit").add_header(COOKIE, cookie.clone()).await;
        response.assert_status_bad_request();
        assert_eq!(response.text(), "Missing id");

        let response = server
            .get("/contacts/edit")
            .add_query_param("id", "abc")
            .add_header(COOKIE, cookie.clone())
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.text(), "Invalid id");

        let response = server
            .get("/contacts/edit")
            .add_query_param("id", 9999)
            .add_header(COOKIE, cookie.clone())
            .await;
        response.assert_status_not_found();

        let response = server
            .post("/contacts/update")
            .add_header(COOKIE, cookie)
            .form(&[("id", "9999"), ("name", "Ghost"), ("phone", "000")])
            .await;
        response.assert_status_not_found();
    }

    #[test_log::test(tokio::test)]
    async fn test_create_requires_name_and_phone() {
        let (server, pool) = create_test_app().await;
        let user = create_test_user(&pool, "admin", "secret").await;

        let response = server
            .post("/contacts/create")
            .add_header(COOKIE, session_cookie_for(&user))
            .form(&[("name", "  "), ("phone", "111")])
            .await;
        response.assert_status_bad_request();
    }
}
