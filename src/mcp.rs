//! MCP JSON-RPC protocol bridge.
//!
//! Adapts the HTTP API into an MCP Streamable HTTP endpoint that Claude
//! Desktop, Cursor and other MCP clients can connect to using the standard
//! JSON-RPC protocol. The bridge is a thin pass-through: every tool call
//! becomes one HTTP request against a running API server, so the two
//! surfaces can never disagree about behavior.
//!
//! * **Tools**: `search_legal_texts` and `get_legal_section`.
//! * **Resources**: `legal://codes/available` lists the imported codes.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::{ErrorData as McpError, ServerHandler};

use crate::client::ApiClient;
use crate::config::Config;
use crate::models::SearchRequest;

const CODES_RESOURCE_URI: &str = "legal://codes/available";

/// Bridges the HTTP API to the MCP JSON-RPC protocol.
///
/// Each MCP session receives a clone of this struct (the client is behind
/// `Arc`), so all sessions share one connection pool.
#[derive(Clone)]
pub struct McpBridge {
    api: Arc<ApiClient>,
}

impl McpBridge {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn tool_descriptors() -> Vec<Tool> {
        vec![
            make_tool(
                "search_legal_texts",
                "Semantic search over German federal law. Finds statutory sections \
                 whose meaning matches the query, ranked by relevance. Optionally \
                 restricted to one legal code (e.g. 'bgb').",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Natural-language search query (German works best)"
                        },
                        "code": {
                            "type": "string",
                            "description": "Restrict results to one legal code, e.g. 'bgb' or 'stgb'"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of results (1-100, default 10)"
                        },
                        "cutoff": {
                            "type": "number",
                            "description": "Maximum cosine distance to include (0-2, default 0.7)"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            make_tool(
                "get_legal_section",
                "Retrieve the full text of one statutory section by its code and \
                 section identifier, e.g. code 'bgb' and section '\u{a7} 823'.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "Legal code identifier, e.g. 'bgb'"
                        },
                        "section": {
                            "type": "string",
                            "description": "Section identifier, e.g. '\u{a7} 1' or 'Art 1'"
                        }
                    },
                    "required": ["code", "section"]
                }),
            ),
        ]
    }

    async fn call_search(&self, args: &serde_json::Value) -> crate::error::Result<String> {
        let request = SearchRequest {
            query: args
                .get("query")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            code: args
                .get("code")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            limit: args
                .get("limit")
                .and_then(|v| v.as_i64())
                .unwrap_or(crate::models::DEFAULT_LIMIT),
            cutoff: args
                .get("cutoff")
                .and_then(|v| v.as_f64())
                .unwrap_or(crate::models::DEFAULT_CUTOFF),
        };
        let response = self.api.search(&request).await?;
        Ok(serde_json::to_string_pretty(&response).unwrap_or_default())
    }

    async fn call_get_section(&self, args: &serde_json::Value) -> crate::error::Result<String> {
        let code = args.get("code").and_then(|v| v.as_str()).unwrap_or_default();
        let section = args
            .get("section")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let response = self.api.get_section(code, section).await?;
        Ok(serde_json::to_string_pretty(&response).unwrap_or_default())
    }
}

fn make_tool(name: &'static str, description: &'static str, schema: serde_json::Value) -> Tool {
    let input_schema: Arc<serde_json::Map<String, serde_json::Value>> = match schema {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    };
    Tool {
        name: Cow::Borrowed(name),
        title: None,
        description: Some(Cow::Borrowed(description)),
        input_schema,
        output_schema: None,
        annotations: Some(ToolAnnotations::new().read_only(true)),
        execution: None,
        icons: None,
        meta: None,
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "legal-mcp".to_string(),
                title: Some("German Legal Text Search".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Semantic search over German federal law (gesetze-im-internet.de). \
                 Use search_legal_texts to find sections by meaning and \
                 get_legal_section to read a specific section in full. The \
                 legal://codes/available resource lists which codes are imported."
                    .to_string(),
            ),
        }
    }

    // ── Tools ────────────────────────────────────────────────────────────

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(
            Self::tool_descriptors(),
        )))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        Self::tool_descriptors().into_iter().find(|t| t.name == name)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        let result = match request.name.as_ref() {
            "search_legal_texts" => self.call_search(&args).await,
            "get_legal_section" => self.call_get_section(&args).await,
            other => {
                return Err(McpError::new(
                    ErrorCode::METHOD_NOT_FOUND,
                    format!("no tool registered with name: {}", other),
                    None,
                ));
            }
        };

        match result {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    // ── Resources ────────────────────────────────────────────────────────

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let mut raw = RawResource::new(CODES_RESOURCE_URI, "Available legal codes");
        raw.description = Some("Legal codes currently imported and searchable".to_string());
        raw.mime_type = Some("application/json".to_string());
        std::future::ready(Ok(ListResourcesResult::with_all_items(vec![
            raw.no_annotation(),
        ])))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri != CODES_RESOURCE_URI {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no resource registered with uri: {}", request.uri),
                None,
            ));
        }

        let response = self.api.list_codes().await.map_err(|e| {
            McpError::new(
                ErrorCode::INTERNAL_ERROR,
                format!("listing codes failed: {}", e),
                None,
            )
        })?;
        let text = serde_json::to_string_pretty(&response).unwrap_or_default();
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, CODES_RESOURCE_URI)],
        })
    }
}

/// Serve the MCP bridge over Streamable HTTP at `/mcp`.
///
/// The bridge talks to a running API server at `api_url`; start one with
/// `legal-mcp serve api` first.
pub async fn run_mcp_server(config: &Config, api_url: &str) -> anyhow::Result<()> {
    let api = Arc::new(ApiClient::new(api_url)?);
    if !api.health_check().await {
        anyhow::bail!(
            "API not reachable at {}; start it with: legal-mcp serve api",
            api.base_url()
        );
    }

    let bridge = McpBridge::new(api);
    let service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let addr: std::net::SocketAddr = config.server.mcp_bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, api_url, "MCP server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_descriptors() {
        let tools = McpBridge::tool_descriptors();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, vec!["search_legal_texts", "get_legal_section"]);
        for tool in &tools {
            assert_eq!(
                tool.input_schema.get("type").and_then(|v| v.as_str()),
                Some("object")
            );
            assert!(tool.input_schema.contains_key("required"));
        }
    }

    #[test]
    fn test_get_tool_lookup() {
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1").unwrap());
        let bridge = McpBridge::new(api);
        assert!(bridge.get_tool("search_legal_texts").is_some());
        assert!(bridge.get_tool("does_not_exist").is_none());
    }
}
