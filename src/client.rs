//! HTTP client for the legal-mcp API.
//!
//! Used by the CLI commands and the MCP bridge, both of which are thin
//! pass-throughs over the HTTP API. Holds one long-lived connection pool
//! with a fixed 300 s timeout; errors from the API's JSON error bodies are
//! surfaced verbatim.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{
    CatalogResponse, CodesResponse, ImportRequest, ImportResponse, SearchRequest, SearchResponse,
    SectionResponse,
};

/// Fixed timeout for CLI-to-API calls; imports can take a while.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness check: true when `GET /health` answers 200. Any transport
    /// failure is "not reachable", not an error.
    pub async fn health_check(&self) -> bool {
        match self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn list_codes(&self) -> Result<CodesResponse> {
        let url = format!("{}/legal-texts/gesetze-im-internet/codes", self.base_url);
        self.get_json(&url).await
    }

    pub async fn list_catalog(&self) -> Result<CatalogResponse> {
        let url = format!("{}/legal-texts/gesetze-im-internet/catalog", self.base_url);
        self.get_json(&url).await
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/legal-texts/gesetze-im-internet/search", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Self::decode(response).await
    }

    pub async fn get_section(&self, code: &str, section: &str) -> Result<SectionResponse> {
        // Section identifiers contain spaces and '§'; build the path with
        // proper percent-encoding.
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("bad API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("API base URL cannot carry a path".into()))?
            .extend(["legal-texts", "gesetze-im-internet", code, section]);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Self::decode(response).await
    }

    pub async fn import(&self, code: &str) -> Result<ImportResponse> {
        let url = format!("{}/legal-texts/gesetze-im-internet/import", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&ImportRequest {
                code: code.to_string(),
            })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Self::decode(response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Self::decode(response).await
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        Error::Transient(format!("API not reachable at {}: {}", self.base_url, e))
    }

    /// Decode a success body, or extract the message from an API error body.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| Error::Endpoint(format!("invalid API response: {}", e)));
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("API returned {}", status));

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(Error::NotFound(message))
        } else if status.is_client_error() {
            Err(Error::InvalidInput(message))
        } else {
            Err(Error::Endpoint(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{Json, Router};

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_check_up_and_down() {
        let router = Router::new().route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy"})) }),
        );
        let url = spawn_stub(router).await;

        let client = ApiClient::new(&url).unwrap();
        assert!(client.health_check().await);

        let unreachable = ApiClient::new("http://127.0.0.1:1").unwrap();
        assert!(!unreachable.health_check().await);
    }

    #[tokio::test]
    async fn test_list_codes() {
        let router = Router::new().route(
            "/legal-texts/gesetze-im-internet/codes",
            get(|| async { Json(serde_json::json!({"codes": ["bgb", "stgb"]})) }),
        );
        let url = spawn_stub(router).await;

        let client = ApiClient::new(&url).unwrap();
        let response = client.list_codes().await.unwrap();
        assert_eq!(response.codes, vec!["bgb".to_string(), "stgb".to_string()]);
    }

    #[tokio::test]
    async fn test_api_error_body_surfaced() {
        let router = Router::new().route(
            "/legal-texts/gesetze-im-internet/codes",
            get(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": {"code": "database", "message": "connection refused"}
                    })),
                )
            }),
        );
        let url = spawn_stub(router).await;

        let client = ApiClient::new(&url).unwrap();
        let err = client.list_codes().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_get_section_encodes_path() {
        let router = Router::new().route(
            "/legal-texts/gesetze-im-internet/{code}/{section}",
            get(
                |axum::extract::Path((code, section)): axum::extract::Path<(String, String)>| async move {
                    Json(serde_json::json!({
                        "code": code,
                        "section": section,
                        "texts": [],
                    }))
                },
            ),
        );
        let url = spawn_stub(router).await;

        let client = ApiClient::new(&url).unwrap();
        let response = client.get_section("bgb", "§ 1").await.unwrap();
        assert_eq!(response.code, "bgb");
        assert_eq!(response.section, "§ 1");
    }
}
