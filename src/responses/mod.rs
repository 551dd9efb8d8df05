//! Uniform tool responses.
//!
//! Every tool answers with one of three shapes: a simple message, a
//! browser/element state report, or an error.

pub mod helpers;

pub use helpers::{Snapshot, TabDescriptor};

use crate::browser::driver::{BrowserDriver, ElementRef};
use crate::dom::SnapshotOptions;
use std::fmt;

/// Text payload returned to the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub text: String,
    pub is_error: bool,
}

impl ToolResponse {
    /// Single text block
    pub fn simple(message: impl Into<String>, is_error: bool) -> Self {
        Self {
            text: message.into(),
            is_error,
        }
    }

    /// Error block, `❌ <message>[: <cause>]`
    pub fn error(message: impl fmt::Display, cause: Option<&dyn fmt::Display>) -> Self {
        let text = match cause {
            Some(cause) => format!("❌ {}: {}", message, cause),
            None => format!("❌ {}", message),
        };
        Self { text, is_error: true }
    }
}

/// Contents of a state report
#[derive(Debug, Clone, Default)]
pub struct StateReport {
    pub action: Option<String>,
    pub generated_code: Option<String>,
    pub extra_notes: Option<String>,
    /// Snapshot settings; `None` skips the snapshot section
    pub snapshot: Option<SnapshotOptions>,
}

impl StateReport {
    /// Report with a default snapshot
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            snapshot: Some(SnapshotOptions::default()),
            ..Default::default()
        }
    }

    /// Builder method: attach generated test code
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.generated_code = Some(code.into());
        self
    }

    /// Builder method: attach free-form notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.extra_notes = Some(notes.into());
        self
    }

    /// Builder method: snapshot with custom settings
    pub fn snapshot(mut self, options: SnapshotOptions) -> Self {
        self.snapshot = Some(options);
        self
    }

    /// Builder method: leave out the snapshot
    pub fn without_snapshot(mut self) -> Self {
        self.snapshot = None;
        self
    }

    fn head(&self) -> Vec<String> {
        let mut sections = Vec::new();
        if let Some(action) = &self.action {
            sections.push(format!("✅ {}", action));
        }
        if let Some(code) = &self.generated_code {
            sections.push(code_section(code));
        }
        sections
    }
}

/// Fenced code section
pub fn code_section(code: &str) -> String {
    format!("## Generated Code\n\n```javascript\n{}\n```", code)
}

/// Render the tab list section
pub fn tabs_section(tabs: &[TabDescriptor]) -> Option<String> {
    if tabs.is_empty() {
        return None;
    }

    let lines: Vec<String> = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let current = if tab.is_active { " (current)" } else { "" };
            format!("  {}. Title: {}; URL: {}{}", i + 1, tab.title, tab.url, current)
        })
        .collect();

    Some(format!("## Browser Tabs\n\n{}", lines.join("\n")))
}

/// Action, code, tabs, page snapshot and notes for the current browser
pub async fn browser_state(driver: &dyn BrowserDriver, report: StateReport) -> ToolResponse {
    let mut sections = report.head();

    let tabs = helpers::browser_tabs(driver).await;
    if let Some(section) = tabs_section(&tabs) {
        sections.push(section);
    }

    if let Some(options) = &report.snapshot {
        if let Some(snapshot) = helpers::page_snapshot(driver, options).await.into_text() {
            sections.push(format!("## Current Tab Snapshot\n\n{}", snapshot));
        }
    }

    if let Some(notes) = &report.extra_notes {
        sections.push(format!("## Additional Information\n\n{}", notes));
    }

    ToolResponse::simple(sections.join("\n\n"), false)
}

/// Action, code, element snapshot and notes for one element
pub async fn element_state(driver: &dyn BrowserDriver, element: &ElementRef, report: StateReport) -> ToolResponse {
    let mut sections = report.head();

    if let Some(options) = &report.snapshot {
        if let Some(snapshot) = helpers::element_snapshot(driver, element, options).await.into_text() {
            sections.push(format!("## Element Snapshot\n\n{}", snapshot));
        }
    }

    if let Some(notes) = &report.extra_notes {
        sections.push(format!("## Additional Information\n\n{}", notes));
    }

    ToolResponse::simple(sections.join("\n\n"), false)
}

/// Action line plus code, without touching the browser
pub fn action_only(report: StateReport) -> ToolResponse {
    ToolResponse::simple(report.head().join("\n\n"), false)
}
