use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::FindOptions,
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;

use super::store::DocumentStore;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDb {
    async fn insert(&self, collection: &str, document: Document) -> Result<ObjectId, AppError> {
        let result = self
            .collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "MongoDB insert failed: {}", e);
                AppError::from(e)
            })?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "MongoDB assigned a non-ObjectId _id: {}",
                result.inserted_id
            ))
        })
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        self.collection(collection)
            .find_one(filter, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "MongoDB find_one failed: {}", e);
                AppError::from(e)
            })
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        let options = FindOptions::builder().limit(limit).build();
        let cursor = self
            .collection(collection)
            .find(filter, options)
            .await
            .map_err(AppError::from)?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!(collection = %collection, "MongoDB cursor iteration failed: {}", e);
            AppError::from(e)
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        changes: Document,
    ) -> Result<u64, AppError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": changes }, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "MongoDB update_one failed: {}", e);
                AppError::from(e)
            })?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, AppError> {
        let result = self
            .collection(collection)
            .delete_one(filter, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "MongoDB delete_one failed: {}", e);
                AppError::from(e)
            })?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
