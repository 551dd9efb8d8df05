//! Best-effort enrichment for state reports.
//!
//! Nothing here fails: problems are logged and reported as an empty or
//! missing result so the rest of the response still reaches the agent.

use crate::browser::driver::{BrowserDriver, ElementRef};
use crate::dom::{SnapshotOptions, capture_snapshot};
use crate::error::Result;

/// One open tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDescriptor {
    pub title: String,
    pub url: String,
    pub is_active: bool,
}

/// Enumerate open tabs, leaving focus where it was
pub async fn list_tabs(driver: &dyn BrowserDriver) -> Result<Vec<TabDescriptor>> {
    let handles = driver.window_handles().await?;
    let current = driver.window_handle().await.ok();

    let mut tabs = Vec::with_capacity(handles.len());
    let mut failure = None;
    for handle in &handles {
        match describe_tab(driver, handle, current.as_deref()).await {
            Ok(tab) => tabs.push(tab),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    // Focus goes back even when a tab could not be read
    if let Some(current) = current {
        driver.switch_to_window(&current).await?;
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(tabs),
    }
}

async fn describe_tab(driver: &dyn BrowserDriver, handle: &str, current: Option<&str>) -> Result<TabDescriptor> {
    driver.switch_to_window(handle).await?;
    let title = driver.title().await.unwrap_or_default();
    let url = driver.current_url().await.unwrap_or_default();
    Ok(TabDescriptor {
        title: if title.is_empty() { "Untitled".to_string() } else { title },
        url: if url.is_empty() { "about:blank".to_string() } else { url },
        is_active: current == Some(handle),
    })
}

/// Like [`list_tabs`] but yields an empty list on failure
pub async fn browser_tabs(driver: &dyn BrowserDriver) -> Vec<TabDescriptor> {
    match list_tabs(driver).await {
        Ok(tabs) => tabs,
        Err(e) => {
            log::warn!("Error getting browser tabs: {}", e);
            Vec::new()
        }
    }
}

/// Result of trying to capture a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Rendered DOM outline
    Structured(String),
    /// Raw markup captured after the structured snapshot failed
    Raw { markup: String, error: String },
    /// Nothing could be captured
    Unavailable,
}

impl Snapshot {
    /// Text for the snapshot section, if any
    pub fn into_text(self) -> Option<String> {
        match self {
            Snapshot::Structured(text) => Some(text),
            Snapshot::Raw { markup, error } => Some(format!(
                "<!-- Structured snapshot unavailable ({}), showing raw HTML instead -->\n{}",
                error.replace("--", "- -"),
                markup
            )),
            Snapshot::Unavailable => None,
        }
    }
}

/// Snapshot of the current page, falling back to the page source
pub async fn page_snapshot(driver: &dyn BrowserDriver, options: &SnapshotOptions) -> Snapshot {
    let error = match capture_snapshot(driver, None, options).await {
        Ok(text) if !text.trim().is_empty() => return Snapshot::Structured(text),
        Ok(_) => "empty snapshot".to_string(),
        Err(e) => e.to_string(),
    };
    log::warn!("Error capturing page snapshot: {}", error);

    match driver.page_source().await {
        Ok(markup) if !markup.trim().is_empty() => Snapshot::Raw { markup, error },
        Ok(_) => Snapshot::Unavailable,
        Err(e) => {
            log::warn!("Error getting page source: {}", e);
            Snapshot::Unavailable
        }
    }
}

/// Snapshot of one element subtree, falling back to its outer HTML
pub async fn element_snapshot(driver: &dyn BrowserDriver, element: &ElementRef, options: &SnapshotOptions) -> Snapshot {
    let error = match capture_snapshot(driver, Some(element), options).await {
        Ok(text) if !text.trim().is_empty() => return Snapshot::Structured(text),
        Ok(_) => "empty snapshot".to_string(),
        Err(e) => e.to_string(),
    };
    log::warn!("Error capturing element snapshot: {}", error);

    match driver.outer_html(element).await {
        Ok(markup) if !markup.trim().is_empty() => Snapshot::Raw { markup, error },
        Ok(_) => Snapshot::Unavailable,
        Err(e) => {
            log::warn!("Error getting element HTML: {}", e);
            Snapshot::Unavailable
        }
    }
}
