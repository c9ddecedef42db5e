//! Shared harness for API integration tests
//!
//! Tests drive the real router with `tower::ServiceExt::oneshot` against a
//! PostgreSQL database named by `DATABASE_URL`. When the variable is unset
//! the harness returns `None` and the calling test skips.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use softdesk_api::app::{build_router, AppState};
use softdesk_api::config::Config;
use softdesk_shared::db::migrations::run_migrations;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

/// A registered, logged-in user
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping");
            return None;
        };

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(database_url.clone()),
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test config");

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("connect to test database");
        run_migrations(&db).await.expect("run migrations");

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self { db, app })
    }

    /// Sends a request and returns the status and parsed JSON body
    /// (`Value::Null` for empty bodies)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user with a random name and logs in
    pub async fn user(&self) -> TestUser {
        let username = format!("user-{}", Uuid::new_v4().simple());
        let password = "Correct-Horse-42";

        let (status, body) = self
            .send(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "password": password,
                    "age": 30,
                    "can_be_contacted": true,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register: {}", body);

        let id: Uuid = serde_json::from_value(body["id"].clone()).unwrap();

        let (status, body) = self
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login: {}", body);

        TestUser {
            id,
            username,
            token: body["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a project owned by `owner` and returns its id
    pub async fn project(&self, owner: &TestUser, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/v1/projects",
                &owner.token,
                json!({ "name": name, "type": "backend" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project: {}", body);
        serde_json::from_value(body["id"].clone()).unwrap()
    }

    /// Adds `user` to the project as a plain contributor; returns the membership id
    pub async fn add_contributor(&self, owner: &TestUser, project_id: Uuid, user: &TestUser) -> Uuid {
        let (status, body) = self
            .post(
                &format!("/v1/projects/{}/contributors", project_id),
                &owner.token,
                json!({ "user": user.id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add contributor: {}", body);
        serde_json::from_value(body["id"].clone()).unwrap()
    }
}

pub fn ids(list: &Value) -> Vec<Uuid> {
    list.as_array()
        .expect("array body")
        .iter()
        .map(|item| serde_json::from_value(item["id"].clone()).unwrap())
        .collect()
}
