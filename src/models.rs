//! Core data models shared by the store, the HTTP API, the CLI client, and
//! the MCP bridge.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hard bounds on search parameters, mirrored by the HTTP API docs.
pub const MAX_LIMIT: i64 = 100;
pub const MAX_CUTOFF: f64 = 2.0;
pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_CUTOFF: f64 = 0.7;

/// One statutory section as stored in `legal_texts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalText {
    /// Short identifier of the legal code (e.g. `bgb`).
    pub code: String,
    /// Section identifier (e.g. `§ 1`).
    pub section: String,
    /// Sub-section identifier; empty string when the source has none.
    pub sub_section: String,
    /// Norm title from the import source, when available.
    pub title: Option<String>,
    /// Full body text of the section.
    pub text: String,
}

/// A search hit: a record plus its cosine distance to the query vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub code: String,
    pub section: String,
    pub sub_section: String,
    pub title: Option<String>,
    pub text: String,
    /// Cosine distance in `[0, 2]`; lower is closer.
    pub distance: f64,
}

/// Request body for `POST /legal-texts/gesetze-im-internet/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_cutoff() -> f64 {
    DEFAULT_CUTOFF
}

impl SearchRequest {
    /// Validate field ranges: query non-empty, limit 1–100, cutoff 0–2.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.limit
            )));
        }
        if !(0.0..=MAX_CUTOFF).contains(&self.cutoff) {
            return Err(Error::InvalidInput(format!(
                "cutoff must be between 0 and {}, got {}",
                MAX_CUTOFF, self.cutoff
            )));
        }
        Ok(())
    }
}

/// Response body for the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub code: Option<String>,
    pub count: usize,
    pub results: Vec<SearchHit>,
}

/// Response body for the codes endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodesResponse {
    pub codes: Vec<String>,
}

/// One importable code in the gesetze-im-internet catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub title: String,
    pub url: String,
}

/// Response body for the catalog endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub entries: Vec<CatalogEntry>,
}

/// Response body for the section endpoint: every sub-section stored under
/// `(code, section)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResponse {
    pub code: String,
    pub section: String,
    pub texts: Vec<LegalText>,
}

/// Request body for the import endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub code: String,
}

/// Response body for the import endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub code: String,
    pub sections_imported: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str, limit: i64, cutoff: f64) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            code: None,
            limit,
            cutoff,
        }
    }

    #[test]
    fn test_valid_request() {
        request("Kaufvertrag", 10, 0.7).validate().unwrap();
        request("x", 1, 0.0).validate().unwrap();
        request("x", 100, 2.0).validate().unwrap();
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = request("   ", 10, 0.7).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_limit_bounds() {
        assert!(request("q", 0, 0.7).validate().is_err());
        assert!(request("q", 101, 0.7).validate().is_err());
    }

    #[test]
    fn test_cutoff_bounds() {
        assert!(request("q", 10, -0.1).validate().is_err());
        assert!(request("q", 10, 2.1).validate().is_err());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: SearchRequest = serde_json::from_str(r#"{"query": "Vertrag"}"#).unwrap();
        assert_eq!(req.limit, DEFAULT_LIMIT);
        assert!((req.cutoff - DEFAULT_CUTOFF).abs() < f64::EPSILON);
        assert!(req.code.is_none());
    }
}
