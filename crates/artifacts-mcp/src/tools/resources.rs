//! Tools that attach external scripts and stylesheets to a page.

use artifacts_core::PageStore;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use super::pages::page_url;
use crate::error::{McpError, McpResult};

/// Parameters for add-scripts and add-stylesheets tools
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddResourcesParams {
    /// Page ID
    pub id: String,
    /// Absolute URLs to add; already present URLs are skipped
    pub urls: Vec<String>,
}

/// Output from add-scripts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddScriptsOutput {
    /// Page ID
    pub id: String,
    /// All script URLs now attached to the page
    pub scripts: Vec<String>,
    /// Preview URL
    pub url: String,
}

/// Output from add-stylesheets
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStylesheetsOutput {
    /// Page ID
    pub id: String,
    /// All stylesheet URLs now attached to the page
    pub stylesheets: Vec<String>,
    /// Preview URL
    pub url: String,
}

/// Validate that every entry parses as an absolute URL
fn validate_urls(urls: &[String]) -> McpResult<()> {
    for url in urls {
        if Url::parse(url).is_err() {
            return Err(McpError::InvalidUrl(url.clone()));
        }
    }
    Ok(())
}

/// Handle add-scripts tool
#[tracing::instrument(skip(store))]
pub fn handle_add_scripts(
    params: AddResourcesParams,
    store: &PageStore,
    base_url: &str,
) -> McpResult<AddScriptsOutput> {
    validate_urls(&params.urls)?;
    let page = store
        .add_scripts(&params.id, params.urls)
        .ok_or(McpError::PageNotFound(params.id))?;

    Ok(AddScriptsOutput {
        url: page_url(base_url, &page.id),
        id: page.id,
        scripts: page.scripts,
    })
}

/// Handle add-stylesheets tool
#[tracing::instrument(skip(store))]
pub fn handle_add_stylesheets(
    params: AddResourcesParams,
    store: &PageStore,
    base_url: &str,
) -> McpResult<AddStylesheetsOutput> {
    validate_urls(&params.urls)?;
    let page = store
        .add_stylesheets(&params.id, params.urls)
        .ok_or(McpError::PageNotFound(params.id))?;

    Ok(AddStylesheetsOutput {
        url: page_url(base_url, &page.id),
        id: page.id,
        stylesheets: page.stylesheets,
    })
}
