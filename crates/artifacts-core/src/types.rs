//! Page and tombstone records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored HTML artifact.
///
/// `created_at` is fixed at creation; `updated_at` equals it on creation and
/// moves forward on every successful mutation.
///
/// ## Serialization
///
/// Uses `camelCase` field names; `name` is omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Opaque unique identifier (UUID v4).
    pub id: String,
    /// Optional human-assigned name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Page title.
    pub title: String,
    /// Raw HTML body as supplied by the caller.
    pub html: String,
    /// Script URLs in insertion order, without duplicates.
    #[serde(default)]
    pub scripts: Vec<String>,
    /// Stylesheet URLs in insertion order, without duplicates.
    #[serde(default)]
    pub stylesheets: Vec<String>,
    /// When the page was created.
    pub created_at: DateTime<Utc>,
    /// When the page was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Label used wherever a page is listed for humans: `name: title`, or just
    /// the title when the page has no name.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name}: {}", self.title),
            None => self.title.clone(),
        }
    }
}

/// Record retained after a page is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    /// Identifier of the removed page.
    pub id: String,
    /// Name the page had when it was removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Title the page had when it was removed.
    pub title: String,
    /// Creation time copied from the page.
    pub created_at: DateTime<Utc>,
    /// When the page was removed.
    pub deleted_at: DateTime<Utc>,
}

impl Tombstone {
    /// Same format as [`Page::label`].
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name}: {}", self.title),
            None => self.title.clone(),
        }
    }

    pub(crate) fn for_page(page: &Page, deleted_at: DateTime<Utc>) -> Self {
        Self {
            id: page.id.clone(),
            name: page.name.clone(),
            title: page.title.clone(),
            created_at: page.created_at,
            deleted_at,
        }
    }
}

/// Parameters for [`PageStore::create`](crate::PageStore::create).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePage {
    /// Page title.
    pub title: String,
    /// HTML body.
    pub html: String,
    /// Optional human-assigned name.
    pub name: Option<String>,
}

impl CreatePage {
    /// Create params with a title and body.
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
            name: None,
        }
    }

    /// Set the name using builder pattern.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Partial update for [`PageStore::update`](crate::PageStore::update).
///
/// Only fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePage {
    /// New title.
    pub title: Option<String>,
    /// New HTML body.
    pub html: Option<String>,
    /// New name.
    pub name: Option<String>,
}

impl UpdatePage {
    /// Whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.html.is_none() && self.name.is_none()
    }
}
