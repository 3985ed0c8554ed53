//! Shared setup for student-service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use mongodb::bson::{oid::ObjectId, Document};
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use student_service::config::{MongoConfig, StudentConfig};
use student_service::services::{DocumentStore, InMemoryStore};
use student_service::{build_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

pub const COLLECTION: &str = "students";

pub fn test_config() -> StudentConfig {
    StudentConfig {
        common: CoreConfig {
            port: 0,
            log_level: "error".to_string(),
        },
        mongodb: MongoConfig {
            url: "mongodb://localhost:27017".to_string(),
            database: "college_test".to_string(),
            collection: COLLECTION.to_string(),
        },
        request_timeout_secs: 5,
        otlp_endpoint: None,
    }
}

/// Router over an in-memory store, driven with `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState {
            config: test_config(),
            store: store.clone(),
        };
        Self {
            router: build_router(state),
            store,
        }
    }

    pub fn stored_count(&self) -> usize {
        self.store.count(COLLECTION)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        send(&self.router, method, uri, body).await
    }

    pub async fn create(&self, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, "/api/student", Some(body)).await
    }
}

/// Sends one request and decodes the JSON body (`Null` when empty).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, json)
}

pub fn jane_doe() -> serde_json::Value {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jdoe@example.com",
        "course": "Nanophotonics",
        "gpa": 3.0
    })
}

/// Store whose every operation fails, standing in for a lost connection.
pub struct FailingStore;

fn unreachable_store() -> AppError {
    AppError::DatabaseError(anyhow::anyhow!(
        "server selection timeout: mongodb://10.0.0.3:27017"
    ))
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _: &str, _: Document) -> Result<ObjectId, AppError> {
        Err(unreachable_store())
    }

    async fn find_one(&self, _: &str, _: Document) -> Result<Option<Document>, AppError> {
        Err(unreachable_store())
    }

    async fn find_many(&self, _: &str, _: Document, _: i64) -> Result<Vec<Document>, AppError> {
        Err(unreachable_store())
    }

    async fn update_one(&self, _: &str, _: Document, _: Document) -> Result<u64, AppError> {
        Err(unreachable_store())
    }

    async fn delete_one(&self, _: &str, _: Document) -> Result<u64, AppError> {
        Err(unreachable_store())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(unreachable_store())
    }
}

pub fn failing_router() -> Router {
    build_router(AppState {
        config: test_config(),
        store: Arc::new(FailingStore),
    })
}

/// Store whose listing never finishes within the request timeout.
pub struct StalledStore;

#[async_trait]
impl DocumentStore for StalledStore {
    async fn insert(&self, _: &str, _: Document) -> Result<ObjectId, AppError> {
        Ok(ObjectId::new())
    }

    async fn find_one(&self, _: &str, _: Document) -> Result<Option<Document>, AppError> {
        Ok(None)
    }

    async fn find_many(&self, _: &str, _: Document, _: i64) -> Result<Vec<Document>, AppError> {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    async fn update_one(&self, _: &str, _: Document, _: Document) -> Result<u64, AppError> {
        Ok(0)
    }

    async fn delete_one(&self, _: &str, _: Document) -> Result<u64, AppError> {
        Ok(0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn stalled_router() -> Router {
    let mut config = test_config();
    config.request_timeout_secs = 1;
    build_router(AppState {
        config,
        store: Arc::new(StalledStore),
    })
}
