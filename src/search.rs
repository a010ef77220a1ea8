//! `legal-mcp search` — semantic search against the HTTP API.

use anyhow::Result;

use crate::client::ApiClient;
use crate::models::SearchRequest;
use crate::output;

/// Run a search. Health-checks the API first and fails closed — with a
/// remediation hint and exit code 1 — rather than attempting the operation
/// against a dead API.
pub async fn run_search(
    api_url: &str,
    query: &str,
    code: Option<String>,
    limit: i64,
    cutoff: f64,
    json: bool,
) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    if !client.health_check().await {
        output::print_error(&format!("API not reachable at {}", client.base_url()));
        output::print_hint("Make sure the API is running: legal-mcp serve api");
        std::process::exit(1);
    }

    let request = SearchRequest {
        query: query.to_string(),
        code,
        limit,
        cutoff,
    };

    match client.search(&request).await {
        Ok(response) => {
            if json {
                output::print_json(&response);
            } else {
                output::print_search_results(&response);
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
