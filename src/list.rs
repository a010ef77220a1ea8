//! `legal-mcp list` — list stored codes or the importable catalog.

use anyhow::Result;

use crate::client::ApiClient;
use crate::output;

pub async fn run_list_codes(api_url: &str, json: bool) -> Result<()> {
    let client = connect(api_url).await?;
    match client.list_codes().await {
        Ok(response) => {
            if json {
                output::print_json(&response);
            } else {
                output::print_codes(&response);
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

pub async fn run_list_catalog(api_url: &str, json: bool) -> Result<()> {
    let client = connect(api_url).await?;
    match client.list_catalog().await {
        Ok(response) => {
            if json {
                output::print_json(&response);
            } else {
                output::print_catalog(&response);
            }
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

pub(crate) async fn connect(api_url: &str) -> Result<ApiClient> {
    let client = ApiClient::new(api_url)?;
    if !client.health_check().await {
        output::print_error(&format!("API not reachable at {}", client.base_url()));
        output::print_hint("Make sure the API is running: legal-mcp serve api");
        std::process::exit(1);
    }
    Ok(client)
}
