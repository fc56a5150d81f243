//! MCP tools for html-artifacts

pub mod pages;
pub mod resources;

pub use pages::{
    CreatePageOutput, CreatePageParams, DestroyPageOutput, PageDetail, PageEntry, PageIdParams,
    UpdatePageOutput, UpdatePageParams, handle_create_page, handle_destroy_page, handle_get_page,
    handle_get_pages, handle_update_page,
};
pub use resources::{
    AddResourcesParams, AddScriptsOutput, AddStylesheetsOutput, handle_add_scripts,
    handle_add_stylesheets,
};
