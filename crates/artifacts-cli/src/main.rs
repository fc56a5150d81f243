//! html-artifacts - preview HTML pages created by MCP clients

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    artifacts_cli::run().await
}
