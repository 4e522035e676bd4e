//! Thin `reqwest` wrapper for talking to a [`super::harness::TestServer`].

use std::time::Duration;

use reqwest::{Method, StatusCode, header::HeaderMap};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body should be JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client should build");
        Self { client, base_url }
    }

    pub async fn health(&self) -> reqwest::Result<HealthResponse> {
        self.client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn metadata(&self) -> reqwest::Result<TestResponse> {
        self.request(Method::GET, "/", None).await
    }

    pub async fn classify(&self, text: &str) -> reqwest::Result<TestResponse> {
        let body = serde_json::json!({ "text": text }).to_string();
        self.request(Method::POST, "/", Some(body)).await
    }

    pub async fn post_raw(&self, body: &str) -> reqwest::Result<TestResponse> {
        self.request(Method::POST, "/", Some(body.to_string())).await
    }

    pub async fn options(&self, path: &str) -> reqwest::Result<TestResponse> {
        self.request(Method::OPTIONS, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> reqwest::Result<TestResponse> {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }
}
