//! `legal-mcp get` — exact-match section lookup against the HTTP API.

use anyhow::Result;

use crate::client::ApiClient;
use crate::output;

pub async fn run_get(api_url: &str, code: &str, section: &str, json: bool) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    if !client.health_check().await {
        output::print_error(&format!("API not reachable at {}", client.base_url()));
        output::print_hint("Make sure the API is running: legal-mcp serve api");
        std::process::exit(1);
    }

    match client.get_section(code, section).await {
        Ok(response) => {
            if json {
                output::print_json(&response);
            } else {
                output::print_section(&response);
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
