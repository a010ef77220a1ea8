//! Ollama embedding client.
//!
//! Converts batches of input strings into fixed-dimension vectors by calling
//! the configured Ollama endpoint's `POST /api/embed`. The client is
//! stateless per call apart from the long-lived HTTP connection pool, which
//! is initialized once from configuration (base URL, optional bearer token,
//! fixed timeout).
//!
//! Failure mapping:
//! - empty input list → [`Error::InvalidInput`], no network call is made
//! - non-success response → [`Error::Endpoint`]; HTTP 404 means the model is
//!   not provisioned and the message tells the operator to pull it
//! - connect/timeout failures → [`Error::Transient`]
//! - a response with the wrong vector count or dimension → [`Error::Endpoint`]
//!
//! There is no retry or backoff anywhere: timeouts are immediate failures
//! and the caller decides what to do with them.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Fixed request timeout for embedding calls.
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam between the HTTP API and the embedding backend. The server and the
/// import pipeline only see this trait, so tests can substitute a stub.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier reported to callers.
    fn model_name(&self) -> &str;

    /// Declared vector dimension; every vector returned by [`embed`] has
    /// exactly this length.
    ///
    /// [`embed`]: Embedder::embed
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// [`Embedder`] backed by an Ollama `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Build the client from configuration. The underlying connection pool
    /// lives as long as the embedder and is released when it is dropped.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(EMBED_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    fn classify_transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Transient(format!(
                "embedding request to {} timed out after {}s",
                self.base_url,
                EMBED_TIMEOUT.as_secs()
            ))
        } else {
            Error::Transient(format!(
                "embedding endpoint not reachable at {}: {}",
                self.base_url, e
            ))
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::InvalidInput("texts list cannot be empty".into()));
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut request = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.auth_token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.auth_token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(Error::Endpoint(format!(
                    "model '{}' not found at {}. Pull it first: ollama pull {}",
                    self.model, self.base_url, self.model
                )));
            }
            return Err(Error::Endpoint(format!(
                "embedding endpoint returned {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Endpoint(format!("invalid embedding response: {}", e)))?;

        let embeddings = parse_embed_response(&json)?;
        check_shape(&embeddings, texts.len(), self.dimension)?;
        tracing::debug!(count = embeddings.len(), model = %self.model, "embedded batch");
        Ok(embeddings)
    }
}

/// Embed a single query text. Convenience wrapper for search handlers.
pub async fn embed_query(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    let mut vectors = embedder.embed(&[text.to_string()]).await?;
    vectors
        .pop()
        .ok_or_else(|| Error::Endpoint("empty embedding response".into()))
}

/// Extract the `embeddings` array from an Ollama `/api/embed` response.
fn parse_embed_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| Error::Endpoint("invalid response: missing embeddings array".into()))?;

    let mut result = Vec::with_capacity(embeddings.len());
    for embedding in embeddings {
        let vec: Vec<f32> = embedding
            .as_array()
            .ok_or_else(|| Error::Endpoint("invalid response: embedding is not an array".into()))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        result.push(vec);
    }
    Ok(result)
}

/// A vector count or dimension mismatch is an error, never a silent resize.
fn check_shape(embeddings: &[Vec<f32>], expected_count: usize, dimension: usize) -> Result<()> {
    if embeddings.len() != expected_count {
        return Err(Error::Endpoint(format!(
            "expected {} embeddings, endpoint returned {}",
            expected_count,
            embeddings.len()
        )));
    }
    for (i, vec) in embeddings.iter().enumerate() {
        if vec.len() != dimension {
            return Err(Error::Endpoint(format!(
                "embedding {} has dimension {}, expected {}",
                i,
                vec.len(),
                dimension
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    fn test_config(base_url: &str, dimension: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            base_url: base_url.to_string(),
            auth_token: String::new(),
            model: "test/embedding-model:latest".to_string(),
            dimension,
        }
    }

    /// Bind a stub Ollama endpoint on an ephemeral port and return its URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_one_vector_per_input() {
        let router = Router::new().route(
            "/api/embed",
            post(|Json(body): Json<serde_json::Value>| async move {
                let n = body["input"].as_array().unwrap().len();
                let vecs: Vec<Vec<f32>> = (0..n).map(|i| vec![i as f32, 0.0, 1.0]).collect();
                Json(serde_json::json!({ "embeddings": vecs }))
            }),
        );
        let url = spawn_stub(router).await;
        let embedder = OllamaEmbedder::new(&test_config(&url, 3)).unwrap();

        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 3);
        for vec in &vectors {
            assert_eq!(vec.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_network() {
        // Unroutable base URL: if a request were made this would not return
        // InvalidInput.
        let embedder = OllamaEmbedder::new(&test_config("http://127.0.0.1:1", 3)).unwrap();
        let err = embedder.embed(&[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_error() {
        let router = Router::new().route(
            "/api/embed",
            post(|| async { Json(serde_json::json!({ "embeddings": [[1.0, 2.0]] })) }),
        );
        let url = spawn_stub(router).await;
        let embedder = OllamaEmbedder::new(&test_config(&url, 3)).unwrap();

        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        match err {
            Error::Endpoint(msg) => assert!(msg.contains("dimension")),
            other => panic!("expected Endpoint error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_not_found_has_remediation() {
        let router = Router::new().route(
            "/api/embed",
            post(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    Json(serde_json::json!({ "error": "model not found" })),
                )
            }),
        );
        let url = spawn_stub(router).await;
        let embedder = OllamaEmbedder::new(&test_config(&url, 3)).unwrap();

        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        match err {
            Error::Endpoint(msg) => {
                assert!(msg.contains("ollama pull test/embedding-model:latest"))
            }
            other => panic!("expected Endpoint error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let embedder = OllamaEmbedder::new(&test_config("http://127.0.0.1:1", 3)).unwrap();
        let err = embedder.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, Error::Transient(_)));
    }

    #[test]
    fn test_parse_response_missing_array() {
        let err = parse_embed_response(&serde_json::json!({ "foo": 1 })).unwrap_err();
        assert!(matches!(err, Error::Endpoint(_)));
    }

    #[test]
    fn test_check_shape_count_mismatch() {
        let vecs = vec![vec![0.0; 3]];
        assert!(check_shape(&vecs, 2, 3).is_err());
        assert!(check_shape(&vecs, 1, 3).is_ok());
    }
}
