//! Page lifecycle tools: create, read, list, update and destroy.

use artifacts_core::{CreatePage, Page, PageStore, UpdatePage};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{McpError, McpResult};

/// Returned by `update_page` when no field is provided.
pub const EMPTY_UPDATE_MESSAGE: &str = "At least one of name, title, or html must be provided";

/// Preview URL of a page.
pub fn page_url(base_url: &str, id: &str) -> String {
    format!("{base_url}/pages/{id}")
}

/// Parameters for create-page tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageParams {
    /// Page title
    pub title: String,
    /// HTML content of the page
    pub html: String,
    /// Optional short name shown next to the title in the dashboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Parameters for tools addressing one page
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageIdParams {
    /// Page ID
    pub id: String,
}

/// Parameters for update-page tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageParams {
    /// Page ID to update
    pub id: String,
    /// New page title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New HTML content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// New page name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Output from create-page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageOutput {
    /// Page ID
    pub id: String,
    /// Page name, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Page title
    pub title: String,
    /// Preview URL
    pub url: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Output from get-page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetail {
    /// Page ID
    pub id: String,
    /// Page name, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Page title
    pub title: String,
    /// HTML content as stored
    pub html: String,
    /// Injected script URLs
    pub scripts: Vec<String>,
    /// Injected stylesheet URLs
    pub stylesheets: Vec<String>,
    /// Preview URL
    pub url: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Individual entry in get-pages output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEntry {
    /// Page ID
    pub id: String,
    /// Page name, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Page title
    pub title: String,
    /// Preview URL
    pub url: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Output from update-page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageOutput {
    /// Page ID
    pub id: String,
    /// Page name, if set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Page title
    pub title: String,
    /// Preview URL
    pub url: String,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Output from destroy-page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyPageOutput {
    /// Page ID
    pub id: String,
    /// Always `true`
    pub deleted: bool,
}

impl PageDetail {
    fn new(page: Page, base_url: &str) -> Self {
        Self {
            url: page_url(base_url, &page.id),
            id: page.id,
            name: page.name,
            title: page.title,
            html: page.html,
            scripts: page.scripts,
            stylesheets: page.stylesheets,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

impl PageEntry {
    fn new(page: Page, base_url: &str) -> Self {
        Self {
            url: page_url(base_url, &page.id),
            id: page.id,
            name: page.name,
            title: page.title,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

/// Handle create-page tool
#[tracing::instrument(skip(params, store), fields(title = %params.title))]
pub fn handle_create_page(
    params: CreatePageParams,
    store: &PageStore,
    base_url: &str,
) -> McpResult<CreatePageOutput> {
    let mut create = CreatePage::new(params.title, params.html);
    create.name = params.name;
    let page = store.create(create);
    tracing::debug!(page_id = %page.id, "page created");

    Ok(CreatePageOutput {
        url: page_url(base_url, &page.id),
        id: page.id,
        name: page.name,
        title: page.title,
        created_at: page.created_at,
    })
}

/// Handle get-page tool
#[tracing::instrument(skip(store))]
pub fn handle_get_page(
    params: PageIdParams,
    store: &PageStore,
    base_url: &str,
) -> McpResult<PageDetail> {
    let page = store
        .get(&params.id)
        .ok_or(McpError::PageNotFound(params.id))?;
    Ok(PageDetail::new(page, base_url))
}

/// Handle get-pages tool
#[tracing::instrument(skip(store))]
pub fn handle_get_pages(store: &PageStore, base_url: &str) -> Vec<PageEntry> {
    store
        .list()
        .into_iter()
        .map(|page| PageEntry::new(page, base_url))
        .collect()
}

/// Handle update-page tool
#[tracing::instrument(skip(params, store), fields(id = %params.id))]
pub fn handle_update_page(
    params: UpdatePageParams,
    store: &PageStore,
    base_url: &str,
) -> McpResult<UpdatePageOutput> {
    let update = UpdatePage {
        title: params.title,
        html: params.html,
        name: params.name,
    };
    if update.is_empty() {
        return Err(McpError::InvalidParams(EMPTY_UPDATE_MESSAGE.to_string()));
    }

    let page = store
        .update(&params.id, update)
        .ok_or(McpError::PageNotFound(params.id))?;

    Ok(UpdatePageOutput {
        url: page_url(base_url, &page.id),
        id: page.id,
        name: page.name,
        title: page.title,
        updated_at: page.updated_at,
    })
}

/// Handle destroy-page tool
#[tracing::instrument(skip(store))]
pub fn handle_destroy_page(
    params: PageIdParams,
    store: &PageStore,
) -> McpResult<DestroyPageOutput> {
    if !store.delete(&params.id) {
        return Err(McpError::PageNotFound(params.id));
    }
    Ok(DestroyPageOutput {
        id: params.id,
        deleted: true,
    })
}
