//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is a data access layer for one table. Rows are never physically removed: `delete`
/// flips `in_use` to false and stamps the audit columns, and every read skips inactive rows
/// unless the filter explicitly asks for them.
use crate::db::errors::Result;
use crate::types::UserId;

/// Base repository trait providing common database operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an active entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities with filtering, in the repository's natural order
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Soft-delete an entity by ID on behalf of `actor`. Returns false if no active row matched.
    async fn delete(&mut self, id: Self::Id, actor: UserId) -> Result<bool>;

    /// Update an active entity by ID
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}
