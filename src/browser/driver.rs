//! Capability-provider seams.
//!
//! The session store, resolver and response builder only talk to a browser
//! through these traits. [`crate::browser::webdriver`] provides the
//! WebDriver-backed implementation; tests provide in-memory fakes.

use crate::browser::config::{BrowserOptions, SessionDescriptor};
use crate::error::Result;
use crate::locator::Selector;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// W3C key identifying a web element reference in JSON payloads
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque reference to an element in the current browsing context
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Serialize as a W3C element reference, e.g. for script arguments
    pub fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }

    /// Parse a W3C element reference
    pub fn from_json(value: &Value) -> Option<Self> {
        value.get(ELEMENT_KEY).and_then(Value::as_str).map(Self::new)
    }
}

/// A live browser session
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    fn session_id(&self) -> &str;

    /// Current URL of the focused tab. Used as the liveness check.
    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Navigate the focused tab and wait for the load to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    async fn window_handles(&self) -> Result<Vec<String>>;

    async fn window_handle(&self) -> Result<String>;

    async fn switch_to_window(&self, handle: &str) -> Result<()>;

    /// Close the focused tab
    async fn close_window(&self) -> Result<()>;

    /// Open a new tab and return its handle. Focus is not moved.
    async fn new_window(&self) -> Result<String>;

    async fn page_source(&self) -> Result<String>;

    /// PNG bytes of the current viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Look up the first element matching `selector`; `None` when nothing matches
    async fn find_element(&self, selector: &Selector) -> Result<Option<ElementRef>>;

    /// Run a synchronous script in the page and return its result
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    async fn click(&self, element: &ElementRef) -> Result<()>;

    /// Move the pointer over the element
    async fn hover(&self, element: &ElementRef) -> Result<()>;

    /// Clear the element and type `text` into it
    async fn set_value(&self, element: &ElementRef, text: &str) -> Result<()>;

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool>;

    async fn outer_html(&self, element: &ElementRef) -> Result<String>;

    /// End the session on the WebDriver side and release owned processes
    async fn delete_session(&self) -> Result<()>;
}

/// Shared handle to a live browser session
pub type BrowserHandle = Arc<dyn BrowserDriver>;

/// Creates browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Start a fresh browser with the given options
    async fn launch(&self, options: &BrowserOptions) -> Result<BrowserHandle>;

    /// Connect to an already running session. Does not verify it.
    async fn attach(&self, session: &SessionDescriptor) -> Result<BrowserHandle>;
}
