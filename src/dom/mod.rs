//! DOM snapshot capture and rendering
//!
//! This module turns the live DOM into a compact, agent-friendly outline:
//! - ElementNode: Representation of DOM elements as serialized in the page
//! - DomTree: Captured tree plus the outline renderer
//! - SnapshotOptions: Tag/attribute filters and text truncation controls

pub mod element;
pub mod tree;

pub use element::ElementNode;
pub use tree::{DomTree, RenderedSnapshot};

use crate::browser::driver::{BrowserDriver, ElementRef};
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tags kept in snapshots unless excluded
pub const DEFAULT_TAGS: &[&str] = &[
    "body", "main", "header", "footer", "nav", "aside", "section", "article", "form", "fieldset", "legend", "h1",
    "h2", "h3", "h4", "h5", "h6", "p", "a", "button", "input", "textarea", "select", "option", "label", "img",
    "ul", "ol", "li", "table", "thead", "tbody", "tr", "th", "td", "dialog", "details", "summary", "iframe",
];

/// Attributes kept in snapshots unless excluded. `aria-*` is always kept.
pub const DEFAULT_ATTRS: &[&str] = &[
    "id",
    "class",
    "name",
    "type",
    "href",
    "role",
    "placeholder",
    "value",
    "alt",
    "title",
    "for",
    "data-testid",
    "checked",
    "disabled",
    "selected",
    "required",
    "readonly",
];

pub const DEFAULT_MAX_TEXT_LENGTH: usize = 100;

/// Controls what ends up in a DOM snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOptions {
    /// HTML tags to include in the snapshot besides defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_tags: Option<Vec<String>>,

    /// HTML attributes to include in the snapshot besides defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_attrs: Option<Vec<String>>,

    /// HTML tags to exclude from the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<Vec<String>>,

    /// HTML attributes to exclude from the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_attrs: Option<Vec<String>>,

    /// Whether to truncate long text content (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate_text: Option<bool>,

    /// Maximum length of text content before truncation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub max_text_length: Option<usize>,
}

/// Capture and render a snapshot of the page or of one element
pub async fn capture_snapshot(
    driver: &dyn BrowserDriver,
    element: Option<&ElementRef>,
    options: &SnapshotOptions,
) -> Result<String> {
    let tree = DomTree::capture(driver, element).await?;
    log::debug!("Captured DOM snapshot with {} elements", tree.count_elements());
    Ok(tree.render(options).to_text())
}
