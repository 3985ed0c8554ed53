//! Process-local document store backing the integration tests.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::store::DocumentStore;

/// Collections keep insertion order, which is their natural order.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<Document>>>, AppError> {
        self.collections
            .read()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("In-memory store poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<Document>>>, AppError> {
        self.collections
            .write()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("In-memory store poisoned: {}", e)))
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<ObjectId, AppError> {
        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let mut collections = self.write()?;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|d| d.get_object_id("_id").ok() == Some(id)) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Duplicate _id {} in collection {}",
                id,
                collection
            )));
        }
        documents.push(document);
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        // Like MongoDB, a non-positive limit means "no limit".
        let limit = usize::try_from(limit)
            .ok()
            .filter(|l| *l > 0)
            .unwrap_or(usize::MAX);

        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<u64, AppError> {
        let mut collections = self.write()?;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        else {
            return Ok(0);
        };

        for (key, value) in changes {
            document.insert(key, value);
        }
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, AppError> {
        let mut collections = self.write()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn insert_assigns_id_and_find_one_returns_it() {
        let store = InMemoryStore::new();
        let id = store
            .insert("students", doc! { "name": "Jane" })
            .await
            .unwrap();

        let found = store
            .find_one("students", doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "Jane");
        assert_eq!(found.get_object_id("_id").unwrap(), id);
    }

    #[tokio::test]
    async fn insert_keeps_caller_supplied_id() {
        let store = InMemoryStore::new();
        let id = ObjectId::new();
        let assigned = store.insert("students", doc! { "_id": id }).await.unwrap();
        assert_eq!(assigned, id);
        assert!(store.insert("students", doc! { "_id": id }).await.is_err());
    }

    #[tokio::test]
    async fn find_many_respects_limit_and_order() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.insert("students", doc! { "n": i }).await.unwrap();
        }

        let docs = store.find_many("students", doc! {}, 3).await.unwrap();
        let ns: Vec<i32> = docs.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2]);

        assert_eq!(store.find_many("students", doc! {}, 0).await.unwrap().len(), 5);
        assert!(store.find_many("other", doc! {}, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_one_sets_fields_on_match() {
        let store = InMemoryStore::new();
        let id = store
            .insert("students", doc! { "name": "Jane", "gpa": 3.0 })
            .await
            .unwrap();

        let matched = store
            .update_one("students", doc! { "_id": id }, doc! { "gpa": 3.5 })
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let found = store
            .find_one("students", doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_f64("gpa").unwrap(), 3.5);
        assert_eq!(found.get_str("name").unwrap(), "Jane");

        let missed = store
            .update_one("students", doc! { "_id": ObjectId::new() }, doc! { "gpa": 1.0 })
            .await
            .unwrap();
        assert_eq!(missed, 0);
    }

    #[tokio::test]
    async fn delete_one_reports_deleted_count() {
        let store = InMemoryStore::new();
        let id = store.insert("students", doc! {}).await.unwrap();

        assert_eq!(store.delete_one("students", doc! { "_id": id }).await.unwrap(), 1);
        assert_eq!(store.delete_one("students", doc! { "_id": id }).await.unwrap(), 0);
        assert_eq!(store.count("students"), 0);
    }
}
