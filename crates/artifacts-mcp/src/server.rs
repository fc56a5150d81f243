//! MCP server implementation for html-artifacts

use artifacts_core::PageStore;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use crate::error::{McpError, McpResult};
use crate::tools::{
    AddResourcesParams, CreatePageParams, PageIdParams, UpdatePageParams, handle_add_scripts,
    handle_add_stylesheets, handle_create_page, handle_destroy_page, handle_get_page,
    handle_get_pages, handle_update_page,
};

/// Name reported in the MCP handshake
pub const SERVER_NAME: &str = "html-artifacts";

const INSTRUCTIONS: &str = "Create HTML pages and preview them in a browser. \
create_page returns a URL that live-reloads on every update; \
add_scripts and add_stylesheets attach external resources by absolute URL.";

/// MCP server exposing page tools over a shared [`PageStore`]
#[derive(Clone)]
pub struct McpServer {
    store: PageStore,
    base_url: String,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server whose page URLs are rooted at `base_url`
    pub fn new(store: PageStore, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            tool_router: Self::tool_router(),
        }
    }

    /// Serve the MCP protocol over stdio
    ///
    /// Returns once the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Protocol`] if initialization or the transport fails.
    pub async fn serve_stdio(&self) -> McpResult<()> {
        tracing::info!("MCP server starting");

        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();

        let service = rmcp::serve_server(self.clone(), (stdin, stdout))
            .await
            .map_err(|e| {
                tracing::error!("server initialization error: {}", e);
                McpError::Protocol(e.to_string())
            })?;

        service.waiting().await.map_err(|e| {
            tracing::error!("server runtime error: {}", e);
            McpError::Protocol(e.to_string())
        })?;

        tracing::info!("MCP server stopped");
        Ok(())
    }
}

/// Turn a handler result into a tool response: not-found and validation
/// failures become error-flagged results, anything else a protocol error.
fn respond<T: Serialize>(result: McpResult<T>) -> Result<CallToolResult, rmcp::ErrorData> {
    match result {
        Ok(output) => Ok(CallToolResult::success(vec![Content::json(output)?])),
        Err(err) if err.is_tool_error() => {
            tracing::debug!("tool error: {err}");
            Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
        },
        Err(err) => Err(err.into()),
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Create an HTML page and return its preview URL")]
    pub async fn create_page(
        &self,
        params: Parameters<CreatePageParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(handle_create_page(params.0, &self.store, &self.base_url))
    }

    #[tool(description = "Get the HTML content and metadata of a specific page")]
    pub async fn get_page(
        &self,
        params: Parameters<PageIdParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(handle_get_page(params.0, &self.store, &self.base_url))
    }

    #[tool(description = "List all live pages")]
    pub async fn get_pages(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(Ok(handle_get_pages(&self.store, &self.base_url)))
    }

    #[tool(description = "Update the name, title or HTML content of an existing page")]
    pub async fn update_page(
        &self,
        params: Parameters<UpdatePageParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(handle_update_page(params.0, &self.store, &self.base_url))
    }

    #[tool(description = "Delete a page")]
    pub async fn destroy_page(
        &self,
        params: Parameters<PageIdParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(handle_destroy_page(params.0, &self.store))
    }

    #[tool(description = "Add external script URLs to a page")]
    pub async fn add_scripts(
        &self,
        params: Parameters<AddResourcesParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(handle_add_scripts(params.0, &self.store, &self.base_url))
    }

    #[tool(description = "Add external stylesheet URLs to a page")]
    pub async fn add_stylesheets(
        &self,
        params: Parameters<AddResourcesParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        respond(handle_add_stylesheets(params.0, &self.store, &self.base_url))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}
