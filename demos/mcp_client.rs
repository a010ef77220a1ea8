//! Minimal MCP client exercising the Streamable HTTP bridge.
//!
//! Speaks raw JSON-RPC over HTTP so the whole protocol exchange is visible:
//! initialize, list tools and resources, read the codes resource, then call
//! both tools.
//!
//! ```bash
//! legal-mcp serve api &
//! legal-mcp serve mcp &
//! cargo run --example mcp_client
//! ```

use serde_json::{json, Value};

const MCP_URL: &str = "http://localhost:8001/mcp";

struct McpClient {
    http: reqwest::Client,
    session_id: Option<String>,
    next_id: i64,
}

impl McpClient {
    fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            session_id: None,
            next_id: 1,
        }
    }

    /// Send one JSON-RPC request and return the `result` member.
    async fn request(&mut self, method: &str, params: Value) -> anyhow::Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let mut req = self
            .http
            .post(MCP_URL)
            .header("Accept", "application/json, text/event-stream")
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }));
        if let Some(session) = &self.session_id {
            req = req.header("mcp-session-id", session.clone());
        }

        let response = req.send().await?;
        if let Some(session) = response.headers().get("mcp-session-id") {
            self.session_id = Some(session.to_str()?.to_string());
        }

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;
        if !status.is_success() {
            anyhow::bail!("{} returned {}: {}", method, status, body);
        }

        // The server answers either with plain JSON or with an SSE stream
        // whose final data line carries the response.
        let message: Value = if content_type.starts_with("text/event-stream") {
            let data = body
                .lines()
                .filter_map(|l| l.strip_prefix("data: "))
                .last()
                .ok_or_else(|| anyhow::anyhow!("empty SSE response for {}", method))?;
            serde_json::from_str(data)?
        } else {
            serde_json::from_str(&body)?
        };

        if let Some(error) = message.get("error") {
            anyhow::bail!("{} failed: {}", method, error);
        }
        Ok(message.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Fire-and-forget notification (no `id`, no response body expected).
    async fn notify(&self, method: &str) -> anyhow::Result<()> {
        let mut req = self
            .http
            .post(MCP_URL)
            .header("Accept", "application/json, text/event-stream")
            .json(&json!({"jsonrpc": "2.0", "method": method}));
        if let Some(session) = &self.session_id {
            req = req.header("mcp-session-id", session.clone());
        }
        req.send().await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut client = McpClient::new();

    let info = client
        .request(
            "initialize",
            json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "mcp-client-demo", "version": "0.1.0"},
            }),
        )
        .await?;
    println!(
        "Connected to {} {}\n",
        info.pointer("/serverInfo/name").and_then(Value::as_str).unwrap_or("?"),
        info.pointer("/serverInfo/version").and_then(Value::as_str).unwrap_or("?"),
    );
    client.notify("notifications/initialized").await?;

    let tools = client.request("tools/list", json!({})).await?;
    println!("Tools:");
    for tool in tools["tools"].as_array().into_iter().flatten() {
        println!("  {}", tool["name"].as_str().unwrap_or("?"));
    }

    let resources = client.request("resources/list", json!({})).await?;
    println!("\nResources:");
    for resource in resources["resources"].as_array().into_iter().flatten() {
        println!("  {}", resource["uri"].as_str().unwrap_or("?"));
    }

    let codes = client
        .request("resources/read", json!({"uri": "legal://codes/available"}))
        .await?;
    println!("\nImported codes:");
    if let Some(text) = codes.pointer("/contents/0/text").and_then(Value::as_str) {
        println!("{}", text);
    }

    let hits = client
        .request(
            "tools/call",
            json!({
                "name": "search_legal_texts",
                "arguments": {
                    "query": "Schadensersatz bei Verletzung des Eigentums",
                    "limit": 3,
                },
            }),
        )
        .await?;
    println!("\nsearch_legal_texts:");
    if let Some(text) = hits.pointer("/content/0/text").and_then(Value::as_str) {
        println!("{}", text);
    }

    let section = client
        .request(
            "tools/call",
            json!({
                "name": "get_legal_section",
                "arguments": {"code": "bgb", "section": "§ 823"},
            }),
        )
        .await?;
    println!("\nget_legal_section bgb § 823:");
    if let Some(text) = section.pointer("/content/0/text").and_then(Value::as_str) {
        println!("{}", text);
    }

    Ok(())
}
