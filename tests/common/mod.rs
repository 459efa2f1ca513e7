#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

use job_tracker::app::{app, AppState};
use job_tracker::config::AppConfig;
use job_tracker::database::{MemoryStore, Record, Store};
use job_tracker::models::{JOB, TIME_PERIOD};
use job_tracker::operations::Factory;

/// Routes test logging through the test harness; RUST_LOG picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn memory_store() -> Arc<dyn Store> {
    init_tracing();
    Arc::new(MemoryStore::new())
}

pub async fn create_time_period(store: &Arc<dyn Store>, month: i64, year: i64) -> Result<Record> {
    let record = Factory::for_class(&TIME_PERIOD, store.clone())
        .create()
        .call(Some(&json!({ "month": month, "year": year })))
        .await
        .into_result()?;
    Ok(record)
}

/// A valid job in `period`, with `overrides` merged over the defaults.
pub async fn create_job(store: &Arc<dyn Store>, period: &Record, overrides: Value) -> Result<Record> {
    let mut attributes = json!({
        "company_name": "Acme",
        "source": "Web",
        "time_period_id": period.id(),
    });
    if let (Some(attributes), Some(overrides)) = (attributes.as_object_mut(), overrides.as_object()) {
        attributes.extend(overrides.clone());
    }

    let record = Factory::for_class(&JOB, store.clone())
        .create()
        .call(Some(&attributes))
        .await
        .into_result()?;
    Ok(record)
}

/// The API router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
}

impl TestApp {
    pub fn new() -> Self {
        init_tracing();
        let state = AppState::memory();
        let store = state.store();
        let router = app(state, &AppConfig::test());
        Self { router, store }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&body)?)
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body)?).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request("DELETE", uri, None).await
    }
}
