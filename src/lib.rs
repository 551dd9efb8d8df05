//! # webdriver-mcp
//!
//! A Rust library for browser automation over the W3C WebDriver protocol, designed for AI agent integration.
//!
//! ## Features
//!
//! - **MCP Server**: Model Context Protocol server for AI-driven browser automation
//! - **Browser Context**: Lazily launch a browser (local driver or grid) or attach to an existing session
//! - **Element Resolution**: Locate elements with wdio selectors (CSS, XPath) or testing-library style semantic queries
//! - **Responses**: Every action reports the equivalent WebdriverIO test code, the open tabs and a DOM snapshot
//!
//! ## MCP Server
//!
//! The recommended way to use this library is via the Model Context Protocol (MCP) server:
//!
//! ```bash
//! # Serve on stdio with a headless local browser
//! cargo run --bin webdriver-mcp -- --headless
//!
//! # Serve over HTTP, driving browsers on a grid
//! cargo run --bin webdriver-mcp -- --transport http --port 3000 --grid-url http://localhost:4444
//! ```
//!
//! ## Library Usage (Advanced)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use webdriver_mcp::browser::{BrowserContext, BrowserOptions, WebDriverLauncher};
//! use webdriver_mcp::locator::ElementResolver;
//! use webdriver_mcp::tools::{ToolContext, ToolRegistry};
//! use serde_json::json;
//!
//! # async fn run() -> webdriver_mcp::Result<()> {
//! let mut browser = BrowserContext::new(
//!     Arc::new(WebDriverLauncher::default()),
//!     BrowserOptions::new().headless(true),
//! );
//! let resolver = ElementResolver::default();
//! let registry = ToolRegistry::with_defaults();
//! let mut context = ToolContext::new(&mut browser, &resolver);
//!
//! registry.execute("navigate", json!({"url": "https://example.com"}), &mut context).await?;
//! let response = registry
//!     .execute(
//!         "clickOnElement",
//!         json!({"locator": {"strategy": "testing-library", "queryType": "role", "queryValue": "link"}}),
//!         &mut context,
//!     )
//!     .await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser options, WebDriver client and the lazily launched browser context
//! - [`locator`]: Locators and the element resolver
//! - [`dom`]: DOM snapshot capture and rendering
//! - [`responses`]: Tool response texts (generated code, tabs, snapshots)
//! - [`tools`]: The browser automation tools and their registry
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod locator;
pub mod responses;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

#[cfg(test)]
mod testing;

pub use browser::{BrowserContext, BrowserOptions, SessionDescriptor};
pub use dom::{DomTree, SnapshotOptions};
pub use error::{BrowserError, Result};
pub use locator::{ElementResolver, Locator};
pub use responses::ToolResponse;
pub use tools::{Tool, ToolContext, ToolRegistry};

#[cfg(feature = "mcp-handler")]
pub use mcp::BrowserServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
