#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use accounter_api::config::AppConfig;
use accounter_api::database::Repositories;
use accounter_api::services::Services;
use accounter_api::{app, AppState};

/// Full router over in-memory storage, driven without a socket.
pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
    }
}

/// Tokens from a register/login/refresh response.
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Result<Self> {
        let services = Services::new(Repositories::in_memory(), &config)?;
        Ok(Self {
            router: app(AppState::new(services, config)),
        })
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, None, Some(token)).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(TestResponse { status, headers, body })
    }

    /// Register an owner with a fixed password and return its session.
    pub async fn register(&self, username: &str) -> Result<Tokens> {
        let res = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({
                    "fullName": "Test Owner",
                    "username": username,
                    "password": "secret123",
                    "phoneNumber": "+996700000000"
                })),
                None,
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {} {}", res.status, res.body);
        tokens(&res)
    }

    pub async fn create_store(&self, token: &str, name: &str, description: &str) -> Result<Value> {
        let res = self
            .request(
                Method::POST,
                "/stores",
                Some(json!({ "name": name, "description": description })),
                Some(token),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create store failed: {} {}", res.status, res.body);
        Ok(res.data().clone())
    }

    pub async fn create_category(&self, token: &str, body: Value) -> Result<Value> {
        let res = self.request(Method::POST, "/categories", Some(body), Some(token)).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create category failed: {} {}", res.status, res.body);
        Ok(res.data().clone())
    }
}

pub fn tokens(res: &TestResponse) -> Result<Tokens> {
    let data = res.data();
    Ok(Tokens {
        access: data["accessToken"].as_str().context("missing accessToken")?.to_string(),
        refresh: data["refreshToken"].as_str().context("missing refreshToken")?.to_string(),
    })
}

pub fn id_of(value: &Value) -> Result<String> {
    Ok(value["id"].as_str().context("missing id")?.to_string())
}
