//! Database repository for contacts.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::contacts::{ContactCreateDBRequest, ContactDBResponse, ContactUpdateDBRequest},
};
use crate::types::{ContactId, UserId};
use chrono::NaiveDateTime;
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing and searching contacts
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Substring matched against name or phone; `None` or empty lists everything
    pub query: Option<String>,
    /// Also return soft-deleted rows
    pub include_inactive: bool,
}

impl ContactFilter {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            include_inactive: false,
        }
    }

    pub fn with_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    /// The `LIKE` pattern for this filter, or `None` when every row matches.
    fn like_pattern(&self) -> Option<String> {
        self.query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)))
    }
}

/// Escape `LIKE` wildcards so user input matches literally. Pairs with `ESCAPE '\'`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub in_use: bool,
    pub inserted_at: NaiveDateTime,
    pub inserted_by: Option<UserId>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<UserId>,
}

impl From<Contact> for ContactDBResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            phone: contact.phone,
            in_use: contact.in_use,
            inserted_at: contact.inserted_at,
            inserted_by: contact.inserted_by,
            updated_at: contact.updated_at,
            updated_by: contact.updated_by,
        }
    }
}

pub struct Contacts<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Contacts<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Contacts<'c> {
    type CreateRequest = ContactCreateDBRequest;
    type UpdateRequest = ContactUpdateDBRequest;
    type Response = ContactDBResponse;
    type Id = ContactId;
    type Filter = ContactFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (name, phone, inserted_by)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.phone)
        .bind(request.inserted_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ContactDBResponse::from(contact))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = ? AND in_use = 1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(contact.map(ContactDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(query = ?filter.query, include_inactive = filter.include_inactive), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let contacts = match filter.like_pattern() {
            Some(pattern) => {
                sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT * FROM contacts
                    WHERE (? OR in_use = 1)
                      AND (name LIKE ? ESCAPE '\' OR phone LIKE ? ESCAPE '\')
                    ORDER BY name ASC
                    "#,
                )
                .bind(filter.include_inactive)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE (? OR in_use = 1) ORDER BY name ASC")
                    .bind(filter.include_inactive)
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(contacts.into_iter().map(ContactDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id, actor: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE contacts SET
                in_use = 0,
                updated_at = CURRENT_TIMESTAMP,
                updated_by = ?
            WHERE id = ? AND in_use = 1
            "#,
        )
        .bind(actor)
        .bind(id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET
                name = ?,
                phone = ?,
                updated_at = CURRENT_TIMESTAMP,
                updated_by = ?
            WHERE id = ? AND in_use = 1
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.phone)
        .bind(request.updated_by)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ContactDBResponse::from(contact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_pool;

    fn create_request(name: &str, phone: &str) -> ContactCreateDBRequest {
        ContactCreateDBRequest {
            name: name.to_string(),
            phone: phone.to_string(),
            inserted_by: 1,
        }
    }

    async fn names(repo: &mut Contacts<'_>, filter: ContactFilter) -> Vec<String> {
        repo.list(&filter).await.unwrap().into_iter().map(|c| c.name).collect()
    }

    #[test_log::test(tokio::test)]
    async fn test_create_contact() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);

        let contact = repo.create(&create_request("Alice", "111")).await.unwrap();
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.phone, "111");
        assert!(contact.in_use);
        assert_eq!(contact.inserted_by, Some(1));
        assert!(contact.updated_at.is_none());

        let fetched = repo.get_by_id(contact.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Alice");
    }

    #[test_log::test(tokio::test)]
    async fn test_search() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);

        // Inserted out of order to check the sort
        repo.create(&create_request("Bob", "222")).await.unwrap();
        repo.create(&create_request("Alice", "111")).await.unwrap();

        assert_eq!(names(&mut repo, ContactFilter::search("ali")).await, vec!["Alice"]);
        assert_eq!(names(&mut repo, ContactFilter::search("")).await, vec!["Alice", "Bob"]);
        assert_eq!(names(&mut repo, ContactFilter::default()).await, vec!["Alice", "Bob"]);
        assert_eq!(names(&mut repo, ContactFilter::search("2")).await, vec!["Bob"]);
        assert!(names(&mut repo, ContactFilter::search("zzz")).await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_search_treats_wildcards_literally() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);

        repo.create(&create_request("Alice", "111")).await.unwrap();
        repo.create(&create_request("100% Bob", "222")).await.unwrap();
        repo.create(&create_request("O'Brien", "333")).await.unwrap();

        assert_eq!(names(&mut repo, ContactFilter::search("%")).await, vec!["100% Bob"]);
        assert!(names(&mut repo, ContactFilter::search("_")).await.is_empty());
        assert!(names(&mut repo, ContactFilter::search("\\")).await.is_empty());
        // Quotes are bound, not spliced into SQL
        assert_eq!(names(&mut repo, ContactFilter::search("'")).await, vec!["O'Brien"]);
        assert!(names(&mut repo, ContactFilter::search("' OR 1=1 --")).await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_soft_delete_hides_contact() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);

        let alice = repo.create(&create_request("Alice", "111")).await.unwrap();
        repo.create(&create_request("Bob", "222")).await.unwrap();

        assert!(repo.delete(alice.id, 5).await.unwrap());
        assert!(repo.get_by_id(alice.id).await.unwrap().is_none());
        assert_eq!(names(&mut repo, ContactFilter::default()).await, vec!["Bob"]);
        assert!(names(&mut repo, ContactFilter::search("ali")).await.is_empty());

        let all = repo.list(&ContactFilter::default().with_inactive()).await.unwrap();
        assert_eq!(all.len(), 2);
        let deleted = all.iter().find(|c| c.id == alice.id).unwrap();
        assert!(!deleted.in_use);
        assert_eq!(deleted.updated_by, Some(5));
        assert!(deleted.updated_at.is_some());

        assert!(!repo.delete(alice.id, 5).await.unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_update_contact() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);

        let contact = repo.create(&create_request("Alice", "111")).await.unwrap();
        let request = ContactUpdateDBRequest {
            name: "Alicia".to_string(),
            phone: "999".to_string(),
            updated_by: 3,
        };

        let updated = repo.update(contact.id, &request).await.unwrap();
        assert_eq!(updated.id, contact.id);
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.phone, "999");
        assert_eq!(updated.updated_by, Some(3));
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.inserted_at, contact.inserted_at);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_inactive_or_missing_is_not_found() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Contacts::new(&mut conn);

        let contact = repo.create(&create_request("Alice", "111")).await.unwrap();
        repo.delete(contact.id, 1).await.unwrap();

        let request = ContactUpdateDBRequest {
            name: "Alicia".to_string(),
            phone: "999".to_string(),
            updated_by: 1,
        };
        assert!(matches!(repo.update(contact.id, &request).await, Err(DbError::NotFound)));
        assert!(matches!(repo.update(9999, &request).await, Err(DbError::NotFound)));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ali"), "ali");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
