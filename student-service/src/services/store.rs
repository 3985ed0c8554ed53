use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;

/// Minimal document-database capability set the handlers rely on.
///
/// Filters are equality documents; an empty filter matches every document.
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts `document`, assigning and returning a fresh `_id` when it has none.
    async fn insert(&self, collection: &str, document: Document) -> Result<ObjectId, AppError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError>;

    /// Returns at most `limit` matching documents in the store's natural order.
    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, AppError>;

    /// Sets the fields of `changes` on the first match; returns the match count.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<u64, AppError>;

    /// Deletes the first match; returns the number of deleted documents.
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
